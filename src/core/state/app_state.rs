use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::InstanceManager;
use crate::core::version::{MetaCacheCatalog, VersionCatalog};

const APP_DIR_NAME: &str = "Patchwork";
const BOOTSTRAP_FILE: &str = "launcher_bootstrap.json";
const SETTINGS_FILE: &str = "launcher_settings.json";

/// Global defaults every instance inherits unless it overrides a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    pub java_path: Option<PathBuf>,
    pub jvm_args: Vec<String>,
    pub min_memory_mb: u32,
    pub max_memory_mb: u32,
    pub permgen_mb: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub launch_maximized: bool,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            java_path: None,
            jvm_args: Vec::new(),
            min_memory_mb: 512,
            max_memory_mb: 1024,
            permgen_mb: 128,
            window_width: 854,
            window_height: 480,
            launch_maximized: false,
        }
    }
}

impl LauncherSettings {
    /// Read `launcher_settings.json` from `data_dir`. A missing or corrupt
    /// file yields the defaults.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Corrupt launcher settings {:?}: {}", path, e);
            Self::default()
        })
    }

    pub fn save(&self, data_dir: &Path) -> LauncherResult<()> {
        std::fs::create_dir_all(data_dir).map_err(|e| LauncherError::io(data_dir, e))?;
        let path = data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| LauncherError::io(path, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BootstrapConfig {
    data_dir: PathBuf,
}

/// Where the launcher keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// The platform data directory, or the directory a bootstrap file in it
    /// redirects to.
    pub fn resolve() -> Self {
        Self::resolve_from(&default_base_dir())
    }

    fn resolve_from(base: &Path) -> Self {
        let bootstrap_path = base.join(BOOTSTRAP_FILE);
        if let Ok(raw) = std::fs::read_to_string(&bootstrap_path) {
            match serde_json::from_str::<BootstrapConfig>(&raw) {
                Ok(cfg) => return Self::at(cfg.data_dir),
                Err(e) => warn!("Ignoring corrupt {:?}: {}", bootstrap_path, e),
            }
        }
        Self::at(base.join(APP_DIR_NAME))
    }

    pub fn at(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.data_dir.join("instances")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    /// Metadata cache backing the version catalog.
    pub fn meta_dir(&self) -> PathBuf {
        self.data_dir.join("meta")
    }

    pub fn ensure_dirs(&self) -> LauncherResult<()> {
        for dir in [self.instances_dir(), self.libraries_dir(), self.meta_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| LauncherError::io(&dir, e))?;
        }
        Ok(())
    }
}

pub struct AppState {
    pub paths: AppPaths,
    pub instance_manager: InstanceManager,
    pub downloader: Arc<Downloader>,
    pub catalog: Arc<dyn VersionCatalog>,
    pub launcher_settings: LauncherSettings,
}

impl AppState {
    pub fn new() -> LauncherResult<Self> {
        Self::with_paths(AppPaths::resolve())
    }

    pub fn with_paths(paths: AppPaths) -> LauncherResult<Self> {
        paths.ensure_dirs()?;
        info!("Using data directory {:?}", paths.data_dir());

        let catalog: Arc<dyn VersionCatalog> = Arc::new(MetaCacheCatalog::new(paths.meta_dir()));
        let instance_manager = InstanceManager::new(paths.instances_dir(), Arc::clone(&catalog));
        let downloader = Arc::new(Downloader::new()?);
        let launcher_settings = LauncherSettings::load(paths.data_dir());

        Ok(Self {
            paths,
            instance_manager,
            downloader,
            catalog,
            launcher_settings,
        })
    }

    pub fn save_settings(&self) -> LauncherResult<()> {
        self.launcher_settings.save(self.paths.data_dir())
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}
