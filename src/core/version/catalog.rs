// ─── Version Catalog ───
// Provides the builtin component patches (base game, LWJGL) by uid and
// version. Injected into strategies instead of being looked up globally.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

use super::patch::{read_patch_file, VersionPatch};

/// A library the legacy FML loader expects in the instance's `lib/` folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmlLibrary {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

pub trait VersionCatalog: Send + Sync {
    /// The patch for `uid` at `version`. Fails with
    /// [`LauncherError::VersionIncomplete`] when the catalog does not have it.
    fn builtin_patch(&self, uid: &str, version: &str) -> LauncherResult<VersionPatch>;

    /// Extra libraries legacy FML needs for a base game version.
    fn fml_libraries(&self, _minecraft_version: &str) -> Vec<FmlLibrary> {
        Vec::new()
    }
}

/// Catalog backed by the metadata cache directory:
/// `<root>/<uid>/<version>.json` and `<root>/fmllibs.json`.
#[derive(Debug, Clone)]
pub struct MetaCacheCatalog {
    root: PathBuf,
}

impl MetaCacheCatalog {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patch_path(&self, uid: &str, version: &str) -> PathBuf {
        self.root.join(uid).join(format!("{}.json", version))
    }
}

impl VersionCatalog for MetaCacheCatalog {
    fn builtin_patch(&self, uid: &str, version: &str) -> LauncherResult<VersionPatch> {
        let path = self.patch_path(uid, version);
        if !path.exists() {
            return Err(LauncherError::VersionIncomplete(uid.to_string()));
        }
        debug!("Loading {} {} from metadata cache", uid, version);
        let mut patch = read_patch_file(&path)?;
        if patch.file_id.is_empty() {
            patch.file_id = uid.to_string();
        }
        if patch.version.is_empty() {
            patch.version = version.to_string();
        }
        Ok(patch)
    }

    fn fml_libraries(&self, minecraft_version: &str) -> Vec<FmlLibrary> {
        let path = self.root.join("fmllibs.json");
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str::<HashMap<String, Vec<FmlLibrary>>>(&raw) {
            Ok(mut mapping) => mapping.remove(minecraft_version).unwrap_or_default(),
            Err(e) => {
                warn!("Corrupt FML library mapping {:?}: {}", path, e);
                Vec::new()
            }
        }
    }
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    patches: HashMap<(String, String), VersionPatch>,
    fml_libraries: HashMap<String, Vec<FmlLibrary>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patch(mut self, patch: VersionPatch) -> Self {
        self.patches
            .insert((patch.file_id.clone(), patch.version.clone()), patch);
        self
    }

    pub fn with_fml_libraries(mut self, minecraft_version: &str, libs: Vec<FmlLibrary>) -> Self {
        self.fml_libraries.insert(minecraft_version.to_string(), libs);
        self
    }
}

impl VersionCatalog for InMemoryCatalog {
    fn builtin_patch(&self, uid: &str, version: &str) -> LauncherResult<VersionPatch> {
        self.patches
            .get(&(uid.to_string(), version.to_string()))
            .cloned()
            .ok_or_else(|| LauncherError::VersionIncomplete(uid.to_string()))
    }

    fn fml_libraries(&self, minecraft_version: &str) -> Vec<FmlLibrary> {
        self.fml_libraries
            .get(minecraft_version)
            .cloned()
            .unwrap_or_default()
    }
}
