use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::core::error::LauncherResult;
use crate::core::profile::{MoveDirection, Profile, ResolvedProfile};
use crate::core::state::LauncherSettings;
use crate::core::strategy::{FtbStrategy, OneSixStrategy, ProfileStrategy};
use crate::core::version::VersionCatalog;

use super::settings::{EffectiveSettings, InstanceSettings};

/// How an instance's patches are stored and managed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// Patches directory plus catalog builtins; fully editable.
    OneSix,
    /// Externally tracked pack; read-only.
    Ftb,
}

impl std::fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceKind::OneSix => write!(f, "onesix"),
            InstanceKind::Ftb => write!(f, "ftb"),
        }
    }
}

/// Instance metadata persisted to disk as `instance.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceConfig {
    pub id: String,
    pub name: String,
    pub kind: InstanceKind,
    pub minecraft_version: String,
    #[serde(default)]
    pub lwjgl_version: Option<String>,
    /// The pack launcher's `versions/` directory for tracked instances.
    /// Defaults to `<instance>/versions`.
    #[serde(default)]
    pub tracked_versions_dir: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub settings: InstanceSettings,
}

impl InstanceConfig {
    pub fn new(name: &str, kind: InstanceKind, minecraft_version: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            minecraft_version: minecraft_version.to_string(),
            lwjgl_version: None,
            tracked_versions_dir: None,
            created_at: Utc::now(),
            last_played: None,
            settings: InstanceSettings::default(),
        }
    }

    pub fn with_lwjgl(mut self, version: &str) -> Self {
        self.lwjgl_version = Some(version.to_string());
        self
    }
}

/// Layout of one instance folder:
/// - `instance.json`
/// - `patches/` and `order.json`
/// - `jarmods/`
/// - `minecraft/` (or a legacy `.minecraft/`) with `lib/` for FML libraries
/// - `temp.jar`, the modded game jar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDirs {
    root: PathBuf,
}

impl InstanceDirs {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("instance.json")
    }

    pub fn patches_dir(&self) -> PathBuf {
        self.root.join("patches")
    }

    pub fn order_file(&self) -> PathBuf {
        self.root.join("order.json")
    }

    pub fn jarmods_dir(&self) -> PathBuf {
        self.root.join("jarmods")
    }

    /// Plain-text version marker left by older pack launchers.
    pub fn version_marker(&self) -> PathBuf {
        self.root.join("version")
    }

    /// `minecraft/`, unless only a `.minecraft/` exists.
    pub fn minecraft_root(&self) -> PathBuf {
        let mc_dir = self.root.join("minecraft");
        let dot_mc_dir = self.root.join(".minecraft");
        if dot_mc_dir.exists() && !mc_dir.exists() {
            dot_mc_dir
        } else {
            mc_dir
        }
    }

    /// Where legacy FML expects its extra libraries.
    pub fn fml_lib_dir(&self) -> PathBuf {
        self.minecraft_root().join("lib")
    }

    pub fn modded_jar_path(&self) -> PathBuf {
        self.root.join("temp.jar")
    }
}

/// A loaded instance: its metadata, folder layout, patch profile and the
/// strategy that manages the patches.
#[derive(Debug)]
pub struct Instance {
    config: InstanceConfig,
    dirs: InstanceDirs,
    profile: Profile,
    strategy: ProfileStrategy,
}

impl Instance {
    pub fn new(config: InstanceConfig, root: PathBuf, catalog: Arc<dyn VersionCatalog>) -> Self {
        let dirs = InstanceDirs::new(root);
        let strategy = match config.kind {
            InstanceKind::OneSix => ProfileStrategy::OneSix(OneSixStrategy::new(
                dirs.clone(),
                &config.minecraft_version,
                config.lwjgl_version.as_deref(),
                catalog,
            )),
            InstanceKind::Ftb => ProfileStrategy::Ftb(FtbStrategy::new(
                dirs.clone(),
                config
                    .tracked_versions_dir
                    .clone()
                    .unwrap_or_else(|| dirs.root().join("versions")),
                &config.minecraft_version,
                &config.name,
            )),
        };
        Self::with_strategy(config, dirs, strategy)
    }

    pub fn with_strategy(config: InstanceConfig, dirs: InstanceDirs, strategy: ProfileStrategy) -> Self {
        Self {
            config,
            dirs,
            profile: Profile::new(),
            strategy,
        }
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InstanceConfig {
        &mut self.config
    }

    pub fn dirs(&self) -> &InstanceDirs {
        &self.dirs
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn strategy(&self) -> &ProfileStrategy {
        &self.strategy
    }

    pub fn reload_profile(&mut self) -> LauncherResult<()> {
        info!("Reloading profile of '{}'", self.config.name);
        self.profile.reload(&self.strategy)
    }

    pub fn resolved(&self) -> LauncherResult<Arc<ResolvedProfile>> {
        self.profile.resolved()
    }

    fn reapply_and_finalize(&mut self) -> LauncherResult<()> {
        self.profile.reapply()?;
        self.profile.finalize();
        Ok(())
    }

    /// Move a patch, merge again and persist the new order. `false` when
    /// the strategy cannot persist an order; nothing is touched then.
    pub fn move_patch(&mut self, index: usize, direction: MoveDirection) -> LauncherResult<bool> {
        if !self.strategy.can_reorder() {
            return Ok(false);
        }
        self.profile.move_patch(index, direction)?;
        self.reapply_and_finalize()?;
        self.strategy.save_order(&self.profile.current_order())
    }

    /// Remove a patch and its storage. `false` when the strategy refused.
    pub fn remove_patch(&mut self, index: usize) -> LauncherResult<bool> {
        if !self.profile.remove(index, &self.strategy)? {
            return Ok(false);
        }
        self.strategy.save_order(&self.profile.current_order())?;
        self.reapply_and_finalize()?;
        Ok(true)
    }

    pub fn install_jar_mods(&mut self, paths: &[PathBuf]) -> LauncherResult<bool> {
        if !self.strategy.install_jar_mods(&mut self.profile, paths)? {
            return Ok(false);
        }
        self.reapply_and_finalize()?;
        Ok(true)
    }

    pub fn effective_settings(&self, global: &LauncherSettings) -> EffectiveSettings {
        self.config.settings.resolve(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::MINECRAFT_UID;
    use crate::core::test_support::{write_json, TempDir};
    use crate::core::version::order::read_order;
    use crate::core::version::{InMemoryCatalog, VersionPatch};
    use serde_json::json;

    fn catalog() -> Arc<dyn VersionCatalog> {
        let mut minecraft = VersionPatch::new(MINECRAFT_UID, "");
        minecraft.version = "1.7.10".into();
        minecraft.main_class = Some("net.minecraft.client.main.Main".into());
        Arc::new(InMemoryCatalog::new().with_patch(minecraft))
    }

    fn open_instance(root: &Path) -> Instance {
        let config = InstanceConfig::new("Test", InstanceKind::OneSix, "1.7.10");
        Instance::new(config, root.to_path_buf(), catalog())
    }

    #[test]
    fn minecraft_root_prefers_plain_folder() {
        let temp = TempDir::new("dirs-root");
        let dirs = InstanceDirs::new(temp.path().to_path_buf());
        assert_eq!(dirs.minecraft_root(), temp.path().join("minecraft"));

        std::fs::create_dir_all(temp.path().join(".minecraft")).unwrap();
        assert_eq!(dirs.minecraft_root(), temp.path().join(".minecraft"));

        std::fs::create_dir_all(temp.path().join("minecraft")).unwrap();
        assert_eq!(dirs.minecraft_root(), temp.path().join("minecraft"));
    }

    #[test]
    fn move_reapplies_and_persists_order() {
        let temp = TempDir::new("instance-move");
        write_json(
            &temp.path().join("patches/a.json"),
            &json!({ "fileId": "a", "order": 1, "mainClass": "A" }),
        );
        write_json(
            &temp.path().join("patches/b.json"),
            &json!({ "fileId": "b", "order": 2, "mainClass": "B" }),
        );
        let mut instance = open_instance(temp.path());
        instance.reload_profile().unwrap();
        assert_eq!(instance.resolved().unwrap().main_class(), "B");

        assert!(instance.move_patch(2, MoveDirection::Up).unwrap());
        assert_eq!(instance.resolved().unwrap().main_class(), "A");
        assert_eq!(read_order(&instance.dirs().order_file()), vec!["b", "a"]);

        let mut reloaded = open_instance(temp.path());
        reloaded.reload_profile().unwrap();
        assert_eq!(reloaded.profile().current_order(), vec!["b", "a"]);
    }

    #[test]
    fn pack_instance_refuses_to_move_patches() {
        let temp = TempDir::new("instance-move-ftb");
        write_json(
            &temp.path().join("versions/1.7.10/1.7.10.json"),
            &json!({ "id": "1.7.10", "mainClass": "net.minecraft.client.main.Main" }),
        );
        write_json(&temp.path().join("minecraft/pack.json"), &json!({}));
        write_json(
            &temp.path().join("patches/a.json"),
            &json!({ "fileId": "a", "order": 1, "mainClass": "A" }),
        );
        write_json(
            &temp.path().join("patches/b.json"),
            &json!({ "fileId": "b", "order": 2, "mainClass": "B" }),
        );
        let config = InstanceConfig::new("Pack", InstanceKind::Ftb, "1.7.10");
        let mut instance = Instance::new(config, temp.path().to_path_buf(), catalog());
        instance.reload_profile().unwrap();
        assert_eq!(instance.profile().current_order(), vec!["a", "b"]);

        assert!(!instance.move_patch(3, MoveDirection::Up).unwrap());
        assert_eq!(instance.profile().current_order(), vec!["a", "b"]);
        assert_eq!(instance.resolved().unwrap().main_class(), "B");
        assert!(!instance.dirs().order_file().exists());
    }

    #[test]
    fn remove_drops_patch_and_file() {
        let temp = TempDir::new("instance-remove");
        write_json(
            &temp.path().join("patches/a.json"),
            &json!({ "fileId": "a", "order": 1, "+traits": ["texturepacks"] }),
        );
        let mut instance = open_instance(temp.path());
        instance.reload_profile().unwrap();
        assert!(instance.resolved().unwrap().has_trait("texturepacks"));

        assert!(!instance.remove_patch(0).unwrap());
        assert!(instance.remove_patch(1).unwrap());
        assert!(!temp.path().join("patches/a.json").exists());
        assert!(!instance.resolved().unwrap().has_trait("texturepacks"));
        assert!(read_order(&instance.dirs().order_file()).is_empty());
    }

    #[test]
    fn installing_jar_mods_requests_modded_jar() {
        let temp = TempDir::new("instance-jarmods");
        let jar = temp.path().join("mod.jar");
        std::fs::write(&jar, b"PK").unwrap();
        let mut instance = open_instance(temp.path());
        instance.reload_profile().unwrap();
        assert!(!instance.resolved().unwrap().steps().build_jar);

        assert!(instance.install_jar_mods(&[jar]).unwrap());
        let resolved = instance.resolved().unwrap();
        assert!(resolved.steps().build_jar);
        assert_eq!(resolved.jar_mods().len(), 1);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = InstanceConfig::new("Pack", InstanceKind::Ftb, "1.7.10").with_lwjgl("2.9.1");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"ftb\""));
        let back: InstanceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
