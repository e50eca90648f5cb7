// Per-instance overrides of the global launcher settings. Each group is
// switched on as a whole; a group left off follows the global value.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::state::LauncherSettings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceSettings {
    pub override_java_location: bool,
    pub java_path: Option<PathBuf>,

    pub override_java_args: bool,
    pub jvm_args: Vec<String>,

    pub override_memory: bool,
    pub min_memory_mb: Option<u32>,
    pub max_memory_mb: Option<u32>,
    pub permgen_mb: Option<u32>,

    pub override_window: bool,
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
    pub launch_maximized: Option<bool>,
}

/// The settings a launch actually uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveSettings {
    pub java_path: Option<PathBuf>,
    pub jvm_args: Vec<String>,
    pub min_memory_mb: u32,
    pub max_memory_mb: u32,
    pub permgen_mb: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub launch_maximized: bool,
}

impl InstanceSettings {
    pub fn resolve(&self, global: &LauncherSettings) -> EffectiveSettings {
        let pick = |overridden: bool, local: Option<u32>, fallback: u32| {
            if overridden {
                local.unwrap_or(fallback)
            } else {
                fallback
            }
        };

        EffectiveSettings {
            java_path: if self.override_java_location {
                self.java_path.clone().or_else(|| global.java_path.clone())
            } else {
                global.java_path.clone()
            },
            jvm_args: if self.override_java_args {
                self.jvm_args.clone()
            } else {
                global.jvm_args.clone()
            },
            min_memory_mb: pick(self.override_memory, self.min_memory_mb, global.min_memory_mb),
            max_memory_mb: pick(self.override_memory, self.max_memory_mb, global.max_memory_mb),
            permgen_mb: pick(self.override_memory, self.permgen_mb, global.permgen_mb),
            window_width: pick(self.override_window, self.window_width, global.window_width),
            window_height: pick(self.override_window, self.window_height, global.window_height),
            launch_maximized: match (self.override_window, self.launch_maximized) {
                (true, Some(maximized)) => maximized,
                _ => global.launch_maximized,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_global_unless_overridden() {
        let global = LauncherSettings {
            jvm_args: vec!["-Xss1M".into()],
            ..LauncherSettings::default()
        };
        let local = InstanceSettings {
            jvm_args: vec!["-XX:+UseG1GC".into()],
            max_memory_mb: Some(4096),
            override_memory: true,
            window_width: Some(1920),
            ..InstanceSettings::default()
        };

        let effective = local.resolve(&global);
        assert_eq!(effective.jvm_args, vec!["-Xss1M"]);
        assert_eq!(effective.max_memory_mb, 4096);
        assert_eq!(effective.min_memory_mb, global.min_memory_mb);
        assert_eq!(effective.window_width, global.window_width);
    }

    #[test]
    fn overridden_java_location_falls_back_when_unset() {
        let global = LauncherSettings {
            java_path: Some(PathBuf::from("/opt/java/bin/java")),
            ..LauncherSettings::default()
        };
        let local = InstanceSettings {
            override_java_location: true,
            ..InstanceSettings::default()
        };
        assert_eq!(local.resolve(&global).java_path, global.java_path);

        let local = InstanceSettings {
            override_java_location: true,
            java_path: Some(PathBuf::from("/usr/lib/jvm/8/bin/java")),
            override_window: true,
            launch_maximized: Some(true),
            ..InstanceSettings::default()
        };
        let effective = local.resolve(&global);
        assert_eq!(effective.java_path, Some(PathBuf::from("/usr/lib/jvm/8/bin/java")));
        assert!(effective.launch_maximized);
    }
}
