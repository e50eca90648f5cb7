// ─── Curated Pack (FTB) Strategy ───
// Read-only: the tracked base game version and the pack's own patch are
// required, user patches are loaded like everywhere else.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::InstanceDirs;
use crate::core::profile::{Profile, LWJGL_UID, MINECRAFT_UID};
use crate::core::version::{read_patch_file, VersionPatch};

use super::user_patches::load_user_patches;

pub const FTB_PACK_UID: &str = "org.multimc.ftb.pack";

const BUILTIN_IDS: &[&str] = &[MINECRAFT_UID, LWJGL_UID, FTB_PACK_UID];

#[derive(Debug, Clone)]
pub struct FtbStrategy {
    dirs: InstanceDirs,
    /// The pack launcher's shared `versions/` directory.
    versions_dir: PathBuf,
    minecraft_version: String,
    instance_name: String,
}

impl FtbStrategy {
    pub fn new(dirs: InstanceDirs, versions_dir: PathBuf, minecraft_version: &str, instance_name: &str) -> Self {
        Self {
            dirs,
            versions_dir,
            minecraft_version: minecraft_version.to_string(),
            instance_name: instance_name.to_string(),
        }
    }

    fn tracked_minecraft_patch(&self) -> LauncherResult<VersionPatch> {
        let mc = &self.minecraft_version;
        let path = self.versions_dir.join(mc).join(format!("{}.json", mc));
        if mc.is_empty() || !path.exists() {
            return Err(LauncherError::VersionIncomplete(MINECRAFT_UID.to_string()));
        }

        let mut patch = read_patch_file(&path)?;
        patch.file_id = MINECRAFT_UID.to_string();
        patch.name = "Minecraft (tracked)".to_string();
        if patch.version.is_empty() {
            patch.version = mc.clone();
        }
        patch.order = -2;
        patch.order_declared = true;
        Ok(patch)
    }

    /// The pack's `pack.json`, whose `libraries` list means "extra local
    /// libraries in front" rather than "the whole library set".
    fn pack_patch(&self) -> LauncherResult<VersionPatch> {
        let path = self.dirs.minecraft_root().join("pack.json");
        if !path.exists() {
            return Err(LauncherError::VersionIncomplete(FTB_PACK_UID.to_string()));
        }

        let mut patch = read_patch_file(&path)?;
        patch.adapt_override_as_local_prepend();
        patch.file_id = FTB_PACK_UID.to_string();
        patch.name = format!("{} (FTB pack)", self.instance_name);
        if patch.version.is_empty() {
            patch.version = self.legacy_version_marker();
        }
        patch.order = -1;
        patch.order_declared = true;
        Ok(patch)
    }

    fn legacy_version_marker(&self) -> String {
        let marker = self.dirs.version_marker();
        match std::fs::read_to_string(&marker) {
            Ok(version) if !version.trim().is_empty() => {
                debug!("Pack version taken from {:?}", marker);
                version.trim().to_string()
            }
            _ => "Unknown".to_string(),
        }
    }

    pub fn load(&self, profile: &mut Profile) -> LauncherResult<()> {
        profile.append_patch(self.tracked_minecraft_patch()?);
        profile.append_patch(self.pack_patch()?);
        info!("Loaded FTB pack patches for {}", self.instance_name);

        load_user_patches(
            profile,
            &self.dirs.patches_dir(),
            &self.dirs.order_file(),
            BUILTIN_IDS,
        )
    }
}
