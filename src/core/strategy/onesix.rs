// ─── Standard (OneSix) Strategy ───
// Builtin base game and LWJGL patches from the version catalog, then the
// instance's own patches directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::InstanceDirs;
use crate::core::profile::{Profile, LWJGL_UID, MINECRAFT_UID};
use crate::core::version::order::write_order;
use crate::core::version::{read_patch_file, write_patch_file, JarMod, VersionCatalog, VersionPatch};

use super::user_patches::load_user_patches;

/// Prefix of the patch ids generated for installed jar mods.
pub const JARMOD_ID_PREFIX: &str = "org.multimc.jarmod.";

const BUILTIN_IDS: &[&str] = &[MINECRAFT_UID, LWJGL_UID];

pub struct OneSixStrategy {
    dirs: InstanceDirs,
    minecraft_version: String,
    lwjgl_version: Option<String>,
    catalog: Arc<dyn VersionCatalog>,
}

impl std::fmt::Debug for OneSixStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneSixStrategy")
            .field("dirs", &self.dirs)
            .field("minecraft_version", &self.minecraft_version)
            .field("lwjgl_version", &self.lwjgl_version)
            .finish_non_exhaustive()
    }
}

impl OneSixStrategy {
    pub fn new(
        dirs: InstanceDirs,
        minecraft_version: &str,
        lwjgl_version: Option<&str>,
        catalog: Arc<dyn VersionCatalog>,
    ) -> Self {
        Self {
            dirs,
            minecraft_version: minecraft_version.to_string(),
            lwjgl_version: lwjgl_version.map(str::to_string),
            catalog,
        }
    }

    pub fn dirs(&self) -> &InstanceDirs {
        &self.dirs
    }

    /// The builtin `uid` patch: the instance's customized copy when
    /// `patches/<uid>.json` exists, the catalog entry otherwise.
    fn builtin_patch(&self, uid: &str, version: &str, name: &str, order: i32) -> LauncherResult<VersionPatch> {
        let custom = self.dirs.patches_dir().join(format!("{}.json", uid));
        let mut patch = if custom.exists() {
            info!("Using customized {} from {:?}", uid, custom);
            let patch = read_patch_file(&custom)?;
            if !patch.file_id.is_empty() && patch.file_id != uid {
                return Err(LauncherError::PatchIdMismatch {
                    expected: uid.to_string(),
                    found: patch.file_id,
                });
            }
            patch
        } else {
            if version.is_empty() {
                return Err(LauncherError::VersionIncomplete(uid.to_string()));
            }
            self.catalog.builtin_patch(uid, version)?
        };

        patch.file_id = uid.to_string();
        if patch.name.is_empty() {
            patch.name = name.to_string();
        }
        if patch.version.is_empty() {
            patch.version = version.to_string();
        }
        patch.order = order;
        patch.order_declared = true;
        Ok(patch)
    }

    pub fn load(&self, profile: &mut Profile) -> LauncherResult<()> {
        profile.append_patch(self.builtin_patch(MINECRAFT_UID, &self.minecraft_version, "Minecraft", -2)?);
        if let Some(lwjgl) = &self.lwjgl_version {
            profile.append_patch(self.builtin_patch(LWJGL_UID, lwjgl, "LWJGL", -1)?);
        }

        load_user_patches(
            profile,
            &self.dirs.patches_dir(),
            &self.dirs.order_file(),
            BUILTIN_IDS,
        )
    }

    pub fn save_order(&self, order: &[String]) -> LauncherResult<bool> {
        write_order(&self.dirs.order_file(), order)?;
        Ok(true)
    }

    pub fn install_jar_mods(&self, profile: &mut Profile, paths: &[PathBuf]) -> LauncherResult<bool> {
        let jarmods_dir = self.dirs.jarmods_dir();
        std::fs::create_dir_all(&jarmods_dir).map_err(|e| LauncherError::io(&jarmods_dir, e))?;

        for source in paths {
            let order = profile.free_order_number()?;
            let id = Uuid::new_v4().simple().to_string();
            let stored_name = format!("{}.jar", id);
            let target = jarmods_dir.join(&stored_name);
            std::fs::copy(source, &target).map_err(|e| LauncherError::io(source, e))?;

            let original = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| stored_name.clone());

            let file_id = format!("{}{}", JARMOD_ID_PREFIX, id);
            let mut patch = VersionPatch::new(&file_id, &format!("{} (jar mod)", original));
            patch.order = order;
            patch.order_declared = true;
            patch.jar_mods.push(JarMod {
                name: stored_name,
                original_name: Some(original),
            });

            let patch_path = self.dirs.patches_dir().join(format!("{}.json", file_id));
            write_patch_file(&patch_path, &patch)?;
            patch.filename = Some(patch_path);

            info!("Installed jar mod {:?} as {}", source, file_id);
            profile.append_patch(patch);
        }

        self.save_order(&profile.current_order())
    }

    pub fn remove_patch(&self, patch: &VersionPatch) -> LauncherResult<bool> {
        if !patch.is_movable() {
            return Ok(false);
        }
        let Some(filename) = &patch.filename else {
            return Ok(false);
        };

        remove_file(filename)?;
        for jar_mod in &patch.jar_mods {
            remove_file(&self.dirs.jarmods_dir().join(&jar_mod.name))?;
        }
        Ok(true)
    }
}

fn remove_file(path: &Path) -> LauncherResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{:?} was already removed", path);
            Ok(())
        }
        Err(e) => Err(LauncherError::io(path, e)),
    }
}
