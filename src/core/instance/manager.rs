use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::model::{Instance, InstanceConfig, InstanceDirs};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::VersionCatalog;

/// Manages the lifecycle of instances on disk.
pub struct InstanceManager {
    /// Root directory where all instances live.
    instances_dir: PathBuf,
    catalog: Arc<dyn VersionCatalog>,
}

impl InstanceManager {
    pub fn new(instances_dir: PathBuf, catalog: Arc<dyn VersionCatalog>) -> Self {
        Self {
            instances_dir,
            catalog,
        }
    }

    pub fn instances_dir(&self) -> &Path {
        &self.instances_dir
    }

    pub fn dirs_for(&self, id: &str) -> InstanceDirs {
        InstanceDirs::new(self.instances_dir.join(id))
    }

    /// Create a new instance on disk with its folder structure:
    /// `minecraft/`, `patches/`, `jarmods/` and `instance.json`.
    pub async fn create(&self, config: InstanceConfig) -> LauncherResult<InstanceConfig> {
        let dirs = self.dirs_for(&config.id);
        if dirs.root().exists() {
            return Err(LauncherError::InstanceAlreadyExists(config.id.clone()));
        }

        let minecraft_dir = dirs.root().join("minecraft");
        let patches_dir = dirs.patches_dir();
        let jarmods_dir = dirs.jarmods_dir();
        tokio::try_join!(
            create_dir_safe(&minecraft_dir),
            create_dir_safe(&patches_dir),
            create_dir_safe(&jarmods_dir),
        )?;

        self.save(&config).await?;

        info!("Created instance '{}' ({})", config.name, config.id);
        Ok(config)
    }

    /// Save instance metadata to disk.
    pub async fn save(&self, config: &InstanceConfig) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(config)?;
        let config_path = self.dirs_for(&config.id).config_path();

        if let Some(parent) = config_path.parent() {
            create_dir_safe(parent).await?;
        }

        tokio::fs::write(&config_path, json)
            .await
            .map_err(|e| LauncherError::io(config_path, e))
    }

    /// Load a single instance's metadata by ID.
    pub async fn load(&self, id: &str) -> LauncherResult<InstanceConfig> {
        let config_path = self.dirs_for(id).config_path();
        if !config_path.exists() {
            return Err(LauncherError::InstanceNotFound(id.to_string()));
        }

        let json = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|e| LauncherError::io(&config_path, e))?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Load an instance and resolve its profile.
    pub async fn open(&self, id: &str) -> LauncherResult<Instance> {
        let config = self.load(id).await?;
        let mut instance = Instance::new(config, self.dirs_for(id).root().to_path_buf(), Arc::clone(&self.catalog));
        instance.reload_profile()?;
        Ok(instance)
    }

    /// List all instances. Unreadable entries are logged and skipped.
    pub async fn list(&self) -> LauncherResult<Vec<InstanceConfig>> {
        let mut instances = Vec::new();

        if !self.instances_dir.exists() {
            return Ok(instances);
        }

        let mut entries = tokio::fs::read_dir(&self.instances_dir)
            .await
            .map_err(|e| LauncherError::io(&self.instances_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LauncherError::io(&self.instances_dir, e))?
        {
            let config_path = entry.path().join("instance.json");
            if !config_path.exists() {
                continue;
            }
            match tokio::fs::read_to_string(&config_path).await {
                Ok(json) => match serde_json::from_str::<InstanceConfig>(&json) {
                    Ok(config) => instances.push(config),
                    Err(e) => warn!("Corrupt instance.json at {:?}: {}", config_path, e),
                },
                Err(e) => warn!("Cannot read {:?}: {}", config_path, e),
            }
        }

        instances.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(instances)
    }

    /// Delete an instance from disk.
    pub async fn delete(&self, id: &str) -> LauncherResult<()> {
        let instance_dir = self.instances_dir.join(id);
        if !instance_dir.exists() {
            return Err(LauncherError::InstanceNotFound(id.to_string()));
        }

        tokio::fs::remove_dir_all(&instance_dir)
            .await
            .map_err(|e| LauncherError::io(instance_dir, e))?;

        info!("Deleted instance {}", id);
        Ok(())
    }

    /// Record a launch and persist.
    pub async fn touch_last_played(&self, config: &mut InstanceConfig) -> LauncherResult<()> {
        config.last_played = Some(Utc::now());
        self.save(config).await
    }
}

async fn create_dir_safe(path: &Path) -> LauncherResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| LauncherError::io(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance::InstanceKind;
    use crate::core::profile::MINECRAFT_UID;
    use crate::core::test_support::TempDir;
    use crate::core::version::{InMemoryCatalog, VersionPatch};

    fn manager(root: &Path) -> InstanceManager {
        let mut minecraft = VersionPatch::new(MINECRAFT_UID, "Minecraft");
        minecraft.version = "1.8.9".into();
        minecraft.main_class = Some("net.minecraft.client.main.Main".into());
        let catalog = InMemoryCatalog::new().with_patch(minecraft);
        InstanceManager::new(root.join("instances"), Arc::new(catalog))
    }

    #[tokio::test]
    async fn create_list_open_delete() {
        let temp = TempDir::new("manager-crud");
        let manager = manager(temp.path());

        let config = InstanceConfig::new("Vanilla", InstanceKind::OneSix, "1.8.9");
        let id = config.id.clone();
        manager.create(config.clone()).await.unwrap();
        assert!(manager.dirs_for(&id).patches_dir().is_dir());
        assert!(matches!(
            manager.create(config).await,
            Err(LauncherError::InstanceAlreadyExists(_))
        ));

        let listed = manager.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Vanilla");

        let instance = manager.open(&id).await.unwrap();
        assert_eq!(
            instance.resolved().unwrap().main_class(),
            "net.minecraft.client.main.Main"
        );

        manager.delete(&id).await.unwrap();
        assert!(matches!(
            manager.load(&id).await,
            Err(LauncherError::InstanceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_skips_corrupt_metadata() {
        let temp = TempDir::new("manager-corrupt");
        let manager = manager(temp.path());
        let broken = manager.instances_dir().join("broken");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("instance.json"), "{").unwrap();

        manager
            .create(InstanceConfig::new("Ok", InstanceKind::OneSix, "1.8.9"))
            .await
            .unwrap();
        let listed = manager.list().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn touch_last_played_persists() {
        let temp = TempDir::new("manager-played");
        let manager = manager(temp.path());
        let mut config = manager
            .create(InstanceConfig::new("Played", InstanceKind::OneSix, "1.8.9"))
            .await
            .unwrap();

        manager.touch_last_played(&mut config).await.unwrap();
        let loaded = manager.load(&config.id).await.unwrap();
        assert!(loaded.last_played.is_some());
    }
}
