// ─── Library Planning ───
// Which library files of a resolved profile still have to be fetched.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::core::downloader::DownloadEntry;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::profile::ResolvedProfile;
use crate::core::version::{LibraryHint, RuleContext};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LibraryPlan {
    pub downloads: Vec<DownloadEntry>,
    /// Files already in the libraries directory.
    pub present: usize,
}

/// Plan the downloads for every active library in `ctx`, natives first.
///
/// Libraries hinted `local` are never downloaded; if any of their files is
/// missing the whole plan fails with the complete list of missing files.
pub fn plan_library_downloads(
    resolved: &ResolvedProfile,
    libraries_dir: &Path,
    ctx: &RuleContext,
) -> LauncherResult<LibraryPlan> {
    let mut plan = LibraryPlan::default();
    let mut missing_local = Vec::new();
    let mut seen = HashSet::new();

    let libs = resolved
        .active_native_libs(ctx)
        .into_iter()
        .chain(resolved.active_normal_libs(ctx));

    for lib in libs {
        if lib.hint() == LibraryHint::Local {
            missing_local.extend(lib.missing_files(libraries_dir, &ctx.os));
            continue;
        }

        for file in lib.files(&ctx.os) {
            let dest = libraries_dir.join(&file.storage_path);
            if !seen.insert(dest.clone()) {
                continue;
            }
            if dest.exists() {
                plan.present += 1;
                continue;
            }
            plan.downloads.push(DownloadEntry::new(file.url, dest));
        }
    }

    if !missing_local.is_empty() {
        return Err(LauncherError::LocalLibrariesMissing(missing_local));
    }

    debug!(
        "Library plan: {} to download, {} present",
        plan.downloads.len(),
        plan.present
    );
    Ok(plan)
}
