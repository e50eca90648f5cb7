// ─── Version Patch ───
// One layer of a profile, parsed from a patch document.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

use super::library::{InsertMode, Library, LibraryHint};
use super::resource::{ResourceKey, ResourceMap};
use super::rules::{self, Rule, RuleContext, RuleResult};

/// A binary overlay applied on top of the base game jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarMod {
    /// File name inside the instance's `jarmods/` directory.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionPatch {
    pub file_id: String,
    pub name: String,
    pub version: String,
    /// Sort key. Negative values mark patches the user cannot move or remove.
    pub order: i32,
    /// Whether `order` came from the document rather than a default.
    pub order_declared: bool,
    pub filename: Option<PathBuf>,
    /// Base game version this patch was made for, if it cares.
    pub mc_version: Option<String>,

    pub main_class: Option<String>,
    pub applet_class: Option<String>,
    pub assets: Option<String>,
    pub minecraft_arguments: Option<String>,
    pub tweakers: Vec<String>,

    pub add_libs: Vec<Arc<Library>>,
    /// Replaces everything accumulated before this patch when present.
    pub override_libs: Option<Vec<Arc<Library>>>,
    pub remove_libs: Vec<String>,

    pub traits: BTreeSet<String>,
    pub jar_mods: Vec<JarMod>,
    pub folders: BTreeMap<String, Vec<String>>,
    /// Component uid to required version.
    pub requires: BTreeMap<String, String>,
}

impl VersionPatch {
    pub fn new(file_id: &str, name: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn is_movable(&self) -> bool {
        self.order >= 0
    }

    pub fn has_jar_mods(&self) -> bool {
        !self.jar_mods.is_empty()
    }

    /// Reinterpret the override list as libraries prepended from local
    /// storage. Used for pack formats whose `libraries` key means "extra
    /// libraries" rather than "the full library set".
    pub fn adapt_override_as_local_prepend(&mut self) {
        let libs = self.override_libs.take().unwrap_or_default();
        self.add_libs = libs
            .into_iter()
            .map(|lib| {
                Arc::new(
                    Library::clone(&lib)
                        .with_hint(LibraryHint::Local)
                        .with_insert(InsertMode::Prepend),
                )
            })
            .collect();
    }

    /// Serialize in the flat patch format.
    pub fn to_json(&self) -> LauncherResult<Value> {
        Ok(serde_json::to_value(PatchDocument::from(self))?)
    }
}

// ─── Flat document format ───

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum RemovedLibrary {
    Name(String),
    Object { name: String },
}

impl RemovedLibrary {
    fn into_name(self) -> String {
        match self {
            RemovedLibrary::Name(name) | RemovedLibrary::Object { name } => name,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct PatchDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_id: Option<String>,
    /// Mojang version files carry their version as `id`.
    #[serde(default, skip_serializing)]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mc_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    main_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    applet_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minecraft_arguments: Option<String>,
    #[serde(
        default,
        rename = "+tweakers",
        alias = "tweakers",
        skip_serializing_if = "Vec::is_empty"
    )]
    tweakers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    libraries: Option<Vec<Library>>,
    #[serde(default, rename = "+libraries", skip_serializing_if = "Vec::is_empty")]
    add_libraries: Vec<Library>,
    #[serde(default, rename = "-libraries", skip_serializing_if = "Vec::is_empty")]
    remove_libraries: Vec<RemovedLibrary>,
    #[serde(default, rename = "+traits", skip_serializing_if = "BTreeSet::is_empty")]
    traits: BTreeSet<String>,
    #[serde(default, rename = "+jarMods", skip_serializing_if = "Vec::is_empty")]
    jar_mods: Vec<JarMod>,
}

impl From<PatchDocument> for VersionPatch {
    fn from(doc: PatchDocument) -> Self {
        let arc_all = |libs: Vec<Library>| libs.into_iter().map(Arc::new).collect::<Vec<_>>();
        Self {
            file_id: doc.file_id.unwrap_or_default(),
            name: doc.name.unwrap_or_default(),
            version: doc.version.or(doc.id).unwrap_or_default(),
            order: doc.order.unwrap_or(0),
            order_declared: doc.order.is_some(),
            filename: None,
            mc_version: doc.mc_version,
            main_class: doc.main_class,
            applet_class: doc.applet_class,
            assets: doc.assets,
            minecraft_arguments: doc.minecraft_arguments,
            tweakers: doc.tweakers,
            add_libs: arc_all(doc.add_libraries),
            override_libs: doc.libraries.map(arc_all),
            remove_libs: doc
                .remove_libraries
                .into_iter()
                .map(RemovedLibrary::into_name)
                .collect(),
            traits: doc.traits,
            jar_mods: doc.jar_mods,
            folders: BTreeMap::new(),
            requires: BTreeMap::new(),
        }
    }
}

impl From<&VersionPatch> for PatchDocument {
    fn from(patch: &VersionPatch) -> Self {
        let unarc = |libs: &[Arc<Library>]| -> Vec<Library> {
            libs.iter().map(|l| Library::clone(l)).collect()
        };
        Self {
            file_id: Some(patch.file_id.clone()),
            id: None,
            name: Some(patch.name.clone()).filter(|s| !s.is_empty()),
            version: Some(patch.version.clone()).filter(|s| !s.is_empty()),
            order: Some(patch.order),
            mc_version: patch.mc_version.clone(),
            main_class: patch.main_class.clone(),
            applet_class: patch.applet_class.clone(),
            assets: patch.assets.clone(),
            minecraft_arguments: patch.minecraft_arguments.clone(),
            tweakers: patch.tweakers.clone(),
            libraries: patch.override_libs.as_deref().map(unarc),
            add_libraries: unarc(&patch.add_libs),
            remove_libraries: patch
                .remove_libs
                .iter()
                .cloned()
                .map(RemovedLibrary::Name)
                .collect(),
            traits: patch.traits.clone(),
            jar_mods: patch.jar_mods.clone(),
        }
    }
}

// ─── Grouped package format ───

#[derive(Debug, Deserialize)]
struct Requirement {
    uid: String,
    #[serde(default)]
    version: Option<String>,
}

/// Pick the common and client-specific data groups, then fold them into one
/// resource map. Client data overrides common data key by key.
fn load_data_groups(groups: &[Value], path: &Path) -> LauncherResult<ResourceMap> {
    let client_ctx = RuleContext::client();
    let common_ctx = RuleContext::common();
    let mut common: Option<&serde_json::Map<String, Value>> = None;
    let mut client: Option<&serde_json::Map<String, Value>> = None;

    for group in groups {
        let obj = group
            .as_object()
            .ok_or_else(|| LauncherError::patch_parse(path, "data groups must be objects"))?;
        let Some(raw_rules) = obj.get("rules") else {
            common = Some(obj);
            continue;
        };
        let group_rules: Vec<Rule> = serde_json::from_value(raw_rules.clone())
            .map_err(|e| LauncherError::patch_parse(path, format!("rules: {}", e)))?;
        if rules::evaluate(&group_rules, &client_ctx) == RuleResult::Allow {
            client = Some(obj);
        } else if rules::evaluate(&group_rules, &common_ctx) == RuleResult::Allow {
            common = Some(obj);
        }
    }

    let mut result = ResourceMap::new();
    for group in [common, client].into_iter().flatten() {
        for (key, value) in group {
            let Some(resource_key) = ResourceKey::from_key(key) else {
                continue;
            };
            let resource = resource_key
                .load(value)
                .map_err(|reason| LauncherError::patch_parse(path, reason))?;
            match result.entry(resource_key) {
                Entry::Occupied(mut existing) => resource.apply_to(existing.get_mut()),
                Entry::Vacant(slot) => {
                    slot.insert(resource);
                }
            }
        }
    }
    Ok(result)
}

fn patch_from_package(obj: &serde_json::Map<String, Value>, path: &Path) -> LauncherResult<VersionPatch> {
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

    let uid = text("uid").unwrap_or_default();
    let version = text("version")
        .ok_or_else(|| LauncherError::patch_parse(path, "package version has no 'version'"))?;

    let mut patch = VersionPatch::new(&uid, &uid);
    patch.version = version;
    if let Some(order) = obj.get("order").and_then(Value::as_i64) {
        patch.order = i32::try_from(order)
            .map_err(|_| LauncherError::patch_parse(path, format!("order {} is out of range", order)))?;
        patch.order_declared = true;
    }

    if let Some(requires) = obj.get("requires") {
        let requires: Vec<Requirement> = serde_json::from_value(requires.clone())
            .map_err(|e| LauncherError::patch_parse(path, format!("requires: {}", e)))?;
        for req in requires {
            patch.requires.insert(req.uid, req.version.unwrap_or_default());
        }
    }

    let groups = match obj.get("data") {
        Some(Value::Array(groups)) => groups.as_slice(),
        Some(_) => return Err(LauncherError::patch_parse(path, "'data' must be an array")),
        None => &[],
    };
    let resources = load_data_groups(groups, path)?;
    let text_of = |key| resources.get(&key).and_then(|r| r.as_text()).map(str::to_string);

    patch.main_class = text_of(ResourceKey::MainClass);
    patch.applet_class = text_of(ResourceKey::AppletClass);
    patch.assets = text_of(ResourceKey::Assets);
    patch.minecraft_arguments = text_of(ResourceKey::Arguments);
    if let Some(tweakers) = resources.get(&ResourceKey::Tweakers).and_then(|r| r.as_text_list()) {
        patch.tweakers = tweakers.to_vec();
    }
    for key in [ResourceKey::Libraries, ResourceKey::Natives] {
        if let Some(libs) = resources.get(&key).and_then(|r| r.as_libraries()) {
            patch.add_libs.extend(libs.iter().cloned());
        }
    }
    if let Some(folders) = resources.get(&ResourceKey::Folders).and_then(|r| r.as_folders()) {
        patch.folders = folders.clone();
    }
    Ok(patch)
}

/// Parse a patch document, flat or grouped. `path` is only used to label
/// errors and record where the patch came from.
pub fn parse_patch(value: &Value, path: &Path) -> LauncherResult<VersionPatch> {
    let obj = value
        .as_object()
        .ok_or_else(|| LauncherError::patch_parse(path, "document root is not an object"))?;

    let mut patch = if obj.contains_key("data") {
        patch_from_package(obj, path)?
    } else {
        let doc: PatchDocument = serde_json::from_value(value.clone())
            .map_err(|e| LauncherError::patch_parse(path, e.to_string()))?;
        VersionPatch::from(doc)
    };
    patch.filename = Some(path.to_path_buf());
    Ok(patch)
}

/// Read and parse a patch file from disk.
pub fn read_patch_file(path: &Path) -> LauncherResult<VersionPatch> {
    debug!("Reading patch {:?}", path);
    let raw = std::fs::read_to_string(path).map_err(|e| LauncherError::io(path, e))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| LauncherError::patch_parse(path, e.to_string()))?;
    parse_patch(&value, path)
}

/// Write a patch in the flat format.
pub fn write_patch_file(path: &Path, patch: &VersionPatch) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(&patch.to_json()?)?;
    std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> LauncherResult<VersionPatch> {
        parse_patch(&value, Path::new("patches/test.json"))
    }

    #[test]
    fn parses_flat_patch_document() {
        let patch = parse(serde_json::json!({
            "fileId": "net.minecraftforge",
            "name": "Forge",
            "version": "10.13.4.1614",
            "order": 5,
            "mcVersion": "1.7.10",
            "mainClass": "net.minecraft.launchwrapper.Launch",
            "+tweakers": ["cpw.mods.fml.common.launcher.FMLTweaker"],
            "+libraries": [{"name": "net.minecraftforge:forge:1.7.10-10.13.4.1614"}],
            "-libraries": [{"name": "org.ow2.asm:asm-all"}, "com.google.guava:guava"],
            "+traits": ["legacyFML"]
        }))
        .unwrap();

        assert_eq!(patch.file_id, "net.minecraftforge");
        assert_eq!(patch.order, 5);
        assert!(patch.order_declared);
        assert_eq!(patch.mc_version.as_deref(), Some("1.7.10"));
        assert_eq!(patch.tweakers.len(), 1);
        assert_eq!(patch.add_libs.len(), 1);
        assert!(patch.override_libs.is_none());
        assert_eq!(
            patch.remove_libs,
            vec!["org.ow2.asm:asm-all".to_string(), "com.google.guava:guava".to_string()]
        );
        assert!(patch.traits.contains("legacyFML"));
        assert_eq!(patch.filename.as_deref(), Some(Path::new("patches/test.json")));
    }

    #[test]
    fn mojang_version_file_uses_id_as_version_and_libraries_as_override() {
        let patch = parse(serde_json::json!({
            "id": "1.7.10",
            "mainClass": "net.minecraft.client.main.Main",
            "libraries": [{"name": "com.mojang:realms:1.3.5"}]
        }))
        .unwrap();

        assert_eq!(patch.version, "1.7.10");
        assert_eq!(patch.override_libs.as_ref().map(Vec::len), Some(1));
        assert!(!patch.order_declared);
    }

    #[test]
    fn malformed_library_is_a_parse_error() {
        let err = parse(serde_json::json!({
            "fileId": "broken",
            "+libraries": [{"name": "nope"}]
        }))
        .unwrap_err();
        assert!(matches!(err, LauncherError::PatchParse { .. }));
    }

    #[test]
    fn grouped_package_prefers_client_data_over_common() {
        let patch = parse(serde_json::json!({
            "uid": "net.minecraft",
            "version": "1.8.9",
            "requires": [{"uid": "org.lwjgl", "version": "2.9.4"}],
            "data": [
                {
                    "mc.assets": "1.8",
                    "java.mainClass": "common.Main",
                    "general.folders": {"minecraft/resourcepacks": ["resourcepacks"]}
                },
                {
                    "rules": [{"action": "allow", "side": "client"}],
                    "java.mainClass": "net.minecraft.client.main.Main",
                    "java.libraries": [{"name": "com.mojang:netty:1.6"}],
                    "general.folders": {"minecraft/screenshots": ["screenshots"]}
                }
            ]
        }))
        .unwrap();

        assert_eq!(patch.file_id, "net.minecraft");
        assert_eq!(patch.version, "1.8.9");
        assert_eq!(patch.main_class.as_deref(), Some("net.minecraft.client.main.Main"));
        assert_eq!(patch.assets.as_deref(), Some("1.8"));
        assert_eq!(patch.add_libs.len(), 1);
        assert_eq!(patch.folders.len(), 2);
        assert_eq!(patch.requires.get("org.lwjgl").map(String::as_str), Some("2.9.4"));
    }

    #[test]
    fn grouped_order_outside_i32_is_a_parse_error() {
        let err = parse(serde_json::json!({
            "uid": "com.example.loader",
            "version": "1.0",
            "order": 4_294_967_297_i64,
            "data": []
        }))
        .unwrap_err();
        assert!(matches!(err, LauncherError::PatchParse { .. }));
    }

    #[test]
    fn override_adapts_to_local_prepend() {
        let mut patch = parse(serde_json::json!({
            "libraries": [{"name": "net.minecraftforge:forge:1.7.10"}]
        }))
        .unwrap();
        patch.adapt_override_as_local_prepend();

        assert!(patch.override_libs.is_none());
        assert_eq!(patch.add_libs.len(), 1);
        assert_eq!(patch.add_libs[0].hint(), LibraryHint::Local);
        assert_eq!(patch.add_libs[0].insert_mode(), InsertMode::Prepend);
    }

    #[test]
    fn flat_document_survives_writing() {
        let mut patch = VersionPatch::new("org.multimc.jarmod.abc", "Optifine (jar mod)");
        patch.order = 3;
        patch.jar_mods.push(JarMod {
            name: "abc.jar".into(),
            original_name: Some("Optifine".into()),
        });

        let value = patch.to_json().unwrap();
        assert_eq!(value["fileId"], "org.multimc.jarmod.abc");
        assert_eq!(value["+jarMods"][0]["originalName"], "Optifine");

        let reparsed = parse(value).unwrap();
        assert_eq!(reparsed.jar_mods, patch.jar_mods);
        assert_eq!(reparsed.order, 3);
    }
}
