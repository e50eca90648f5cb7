// ─── Order Document ───
// The user's explicit patch order, persisted next to the patches directory.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

const ORDER_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct OrderDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    order: Vec<String>,
}

/// Read the user-defined patch order. A missing document is an empty order;
/// an unreadable or malformed one is logged and treated the same way.
pub fn read_order(path: &Path) -> Vec<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Cannot read order document {:?}: {}", path, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<OrderDocument>(&raw) {
        Ok(doc) if doc.version == ORDER_FORMAT_VERSION => doc.order,
        Ok(doc) => {
            warn!(
                "Order document {:?} has unsupported version {}, ignoring it",
                path, doc.version
            );
            Vec::new()
        }
        Err(e) => {
            warn!("Corrupt order document {:?}: {}", path, e);
            Vec::new()
        }
    }
}

pub fn write_order(path: &Path, order: &[String]) -> LauncherResult<()> {
    let doc = OrderDocument {
        version: ORDER_FORMAT_VERSION,
        order: order.to_vec(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(&doc)?;
    std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::TempDir;

    #[test]
    fn missing_document_is_empty_order() {
        let temp = TempDir::new("order-missing");
        assert!(read_order(&temp.path().join("order.json")).is_empty());
    }

    #[test]
    fn written_order_reads_back() {
        let temp = TempDir::new("order-write");
        let path = temp.path().join("order.json");
        let order = vec!["com.mumfrey.liteloader".to_string(), "net.minecraftforge".to_string()];

        write_order(&path, &order).unwrap();
        assert_eq!(read_order(&path), order);
    }

    #[test]
    fn corrupt_document_is_ignored() {
        let temp = TempDir::new("order-corrupt");
        let path = temp.path().join("order.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(read_order(&path).is_empty());
    }
}
