// User patch loading shared by the file-backed strategies.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::profile::Profile;
use crate::core::version::order::read_order;
use crate::core::version::{read_patch_file, VersionPatch};

fn json_files(dir: &Path) -> LauncherResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LauncherError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LauncherError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn append_unique(profile: &mut Profile, patch: VersionPatch) -> LauncherResult<()> {
    if profile.contains(&patch.file_id) {
        return Err(LauncherError::DuplicatePatch(patch.file_id));
    }
    profile.append_patch(patch);
    Ok(())
}

/// Load the user patches of `patches_dir` into `profile`.
///
/// Ids named by the order document come first, in document order. The
/// remaining files follow by their declared order value; two of them
/// declaring the same value abort the load. Files that declare no order at
/// all come last, by file name. Ids in `builtin_ids` are never loaded here.
pub fn load_user_patches(
    profile: &mut Profile,
    patches_dir: &Path,
    order_file: &Path,
    builtin_ids: &[&str],
) -> LauncherResult<()> {
    let user_order = read_order(order_file);
    let initial = profile.len();
    let mut explicit: HashSet<&str> = HashSet::new();

    for id in &user_order {
        if builtin_ids.contains(&id.as_str()) {
            continue;
        }
        explicit.insert(id.as_str());

        let path = patches_dir.join(format!("{}.json", id));
        if !path.exists() {
            warn!("Patch {:?} listed in the order document no longer exists", path);
            continue;
        }
        debug!("Reading {:?} by user order", path);
        let patch = read_patch_file(&path)?;
        if patch.file_id != *id {
            return Err(LauncherError::PatchIdMismatch {
                expected: id.clone(),
                found: patch.file_id,
            });
        }
        append_unique(profile, patch)?;
    }

    let mut by_order: BTreeMap<i32, VersionPatch> = BTreeMap::new();
    let mut unordered: Vec<VersionPatch> = Vec::new();
    for path in json_files(patches_dir)? {
        let stem = file_stem(&path);
        if builtin_ids.contains(&stem.as_str()) || explicit.contains(stem.as_str()) {
            continue;
        }
        let mut patch = read_patch_file(&path)?;
        if patch.file_id.is_empty() {
            patch.file_id = stem;
        } else if patch.file_id != stem {
            return Err(LauncherError::PatchIdMismatch {
                expected: stem,
                found: patch.file_id,
            });
        }

        if !patch.order_declared {
            unordered.push(patch);
            continue;
        }
        if let Some(existing) = by_order.get(&patch.order) {
            return Err(LauncherError::OrderCollision {
                first: existing.file_id.clone(),
                second: patch.file_id,
                order: patch.order,
            });
        }
        by_order.insert(patch.order, patch);
    }

    let leftover = by_order.len() + unordered.len();
    for patch in by_order.into_values().chain(unordered) {
        append_unique(profile, patch)?;
    }

    info!(
        "Loaded user patches from {:?}: {} by user order, {} by declared order",
        patches_dir,
        profile.len() - initial - leftover,
        leftover
    );
    Ok(())
}
