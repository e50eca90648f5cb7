// ─── Resolution Strategies ───
// How an instance kind loads, orders and persists its patches.

pub mod ftb;
pub mod onesix;
mod user_patches;

use std::path::PathBuf;

use crate::core::error::LauncherResult;
use crate::core::profile::Profile;
use crate::core::version::VersionPatch;

pub use ftb::FtbStrategy;
pub use onesix::OneSixStrategy;
pub use user_patches::load_user_patches;

/// Dispatcher sin Box<dyn>. Selected once per instance; `Null` loads
/// nothing and refuses every mutation.
#[derive(Debug, Default)]
pub enum ProfileStrategy {
    #[default]
    Null,
    OneSix(OneSixStrategy),
    Ftb(FtbStrategy),
}

impl ProfileStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            ProfileStrategy::Null => "null",
            ProfileStrategy::OneSix(_) => "onesix",
            ProfileStrategy::Ftb(_) => "ftb",
        }
    }

    /// Append builtin and user patches to an already cleared `profile`.
    pub fn load(&self, profile: &mut Profile) -> LauncherResult<()> {
        match self {
            ProfileStrategy::Null => Ok(()),
            ProfileStrategy::OneSix(s) => s.load(profile),
            ProfileStrategy::Ftb(s) => s.load(profile),
        }
    }

    /// Whether the user may reorder patches. Only strategies that can
    /// persist the order allow it.
    pub fn can_reorder(&self) -> bool {
        matches!(self, ProfileStrategy::OneSix(_))
    }

    /// Persist the user-defined order of the movable patches.
    pub fn save_order(&self, order: &[String]) -> LauncherResult<bool> {
        match self {
            ProfileStrategy::OneSix(s) => s.save_order(order),
            ProfileStrategy::Null | ProfileStrategy::Ftb(_) => Ok(false),
        }
    }

    /// Copy jar files into the instance and add one patch per jar.
    pub fn install_jar_mods(&self, profile: &mut Profile, paths: &[PathBuf]) -> LauncherResult<bool> {
        match self {
            ProfileStrategy::OneSix(s) => s.install_jar_mods(profile, paths),
            ProfileStrategy::Null | ProfileStrategy::Ftb(_) => Ok(false),
        }
    }

    /// Delete the storage behind `patch`. The profile entry itself is
    /// dropped by the caller once this returns `true`.
    pub fn remove_patch(&self, patch: &VersionPatch) -> LauncherResult<bool> {
        match self {
            ProfileStrategy::OneSix(s) => s.remove_patch(patch),
            ProfileStrategy::Null | ProfileStrategy::Ftb(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_strategy_is_default_and_refuses_everything() {
        let strategy = ProfileStrategy::default();
        let mut profile = Profile::new();

        assert_eq!(strategy.kind(), "null");
        assert!(!strategy.can_reorder());
        strategy.load(&mut profile).unwrap();
        assert!(profile.is_empty());
        assert!(!strategy.save_order(&["a".to_string()]).unwrap());
        assert!(!strategy
            .install_jar_mods(&mut profile, &[PathBuf::from("mod.jar")])
            .unwrap());
        assert!(!strategy.remove_patch(&VersionPatch::new("a", "a")).unwrap());
    }
}
