// ─── Typed Resources ───
// Keyed data carried by grouped package documents. Each variant knows how it
// merges onto an earlier value for the same key.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::library::Library;

/// Resource keys understood in a package data group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKey {
    Folders,
    Libraries,
    Natives,
    MainClass,
    AppletClass,
    Assets,
    Arguments,
    Tweakers,
}

impl ResourceKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "general.folders" => Some(Self::Folders),
            "java.libraries" => Some(Self::Libraries),
            "java.natives" => Some(Self::Natives),
            "java.mainClass" => Some(Self::MainClass),
            "mc.appletClass" => Some(Self::AppletClass),
            "mc.assets" => Some(Self::Assets),
            "mc.arguments" => Some(Self::Arguments),
            "mc.tweakers" => Some(Self::Tweakers),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folders => "general.folders",
            Self::Libraries => "java.libraries",
            Self::Natives => "java.natives",
            Self::MainClass => "java.mainClass",
            Self::AppletClass => "mc.appletClass",
            Self::Assets => "mc.assets",
            Self::Arguments => "mc.arguments",
            Self::Tweakers => "mc.tweakers",
        }
    }

    /// Parse a raw JSON value into the variant this key carries.
    pub fn load(&self, value: &Value) -> Result<Resource, String> {
        match self {
            Self::MainClass | Self::AppletClass | Self::Assets | Self::Arguments => value
                .as_str()
                .map(|s| Resource::Text(s.to_string()))
                .ok_or_else(|| format!("{} must be a string", self.as_str())),
            Self::Tweakers => serde_json::from_value::<Vec<String>>(value.clone())
                .map(Resource::TextList)
                .map_err(|e| format!("{}: {}", self.as_str(), e)),
            Self::Folders => serde_json::from_value::<BTreeMap<String, Vec<String>>>(value.clone())
                .map(Resource::Folders)
                .map_err(|e| format!("{}: {}", self.as_str(), e)),
            Self::Libraries | Self::Natives => {
                serde_json::from_value::<Vec<Library>>(value.clone())
                    .map(|libs| Resource::Libraries(libs.into_iter().map(Arc::new).collect()))
                    .map_err(|e| format!("{}: {}", self.as_str(), e))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Text(String),
    TextList(Vec<String>),
    /// Folder path to the content types it holds.
    Folders(BTreeMap<String, Vec<String>>),
    Libraries(Vec<Arc<Library>>),
}

impl Resource {
    /// Merge `self` onto an earlier value of the same key.
    ///
    /// Folders unite; every other variant replaces. A variant mismatch
    /// replaces the target wholesale.
    pub fn apply_to(&self, target: &mut Resource) {
        match (self, target) {
            (Resource::Folders(src), Resource::Folders(dst)) => {
                for (path, kinds) in src {
                    dst.insert(path.clone(), kinds.clone());
                }
            }
            (src, dst) => *dst = src.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Resource::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Resource::TextList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_libraries(&self) -> Option<&[Arc<Library>]> {
        match self {
            Resource::Libraries(libs) => Some(libs),
            _ => None,
        }
    }

    pub fn as_folders(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Resource::Folders(folders) => Some(folders),
            _ => None,
        }
    }
}

/// Resources of one document after its data groups were folded.
pub type ResourceMap = BTreeMap<ResourceKey, Resource>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders_unite_and_text_replaces() {
        let mut folders = ResourceKey::Folders
            .load(&serde_json::json!({"minecraft/mods": ["mods"]}))
            .unwrap();
        ResourceKey::Folders
            .load(&serde_json::json!({"minecraft/coremods": ["coremods"]}))
            .unwrap()
            .apply_to(&mut folders);
        assert_eq!(folders.as_folders().unwrap().len(), 2);

        let mut main = Resource::Text("a.Main".into());
        Resource::Text("b.Main".into()).apply_to(&mut main);
        assert_eq!(main.as_text(), Some("b.Main"));
    }

    #[test]
    fn wrong_json_type_is_rejected() {
        assert!(ResourceKey::MainClass.load(&serde_json::json!(3)).is_err());
        assert!(ResourceKey::Tweakers.load(&serde_json::json!("x")).is_err());
    }

    #[test]
    fn unknown_keys_are_not_resources() {
        assert_eq!(ResourceKey::from_key("mc.unknown"), None);
        assert_eq!(
            ResourceKey::from_key("java.natives"),
            Some(ResourceKey::Natives)
        );
    }
}
