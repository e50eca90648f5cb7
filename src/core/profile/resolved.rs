// ─── Resolved Profile ───
// The effective launch configuration folded from a patch sequence.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::json;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::artifact_prefix_of;
use crate::core::version::{InsertMode, JarMod, Library, RuleContext, VersionPatch};

/// Uid of the base game patch.
pub const MINECRAFT_UID: &str = "net.minecraft";
pub const LWJGL_UID: &str = "org.lwjgl";
pub const FORGE_UID: &str = "net.minecraftforge";
/// Trait contributed by old Forge versions that need extra FML libraries.
pub const LEGACY_FML_TRAIT: &str = "legacyFML";

/// Optional steps a consumer of the profile has to run, derived from the
/// complete merged state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostMergeSteps {
    /// Jar mods are present; a modded game jar must be built.
    pub build_jar: bool,
    /// Legacy FML libraries must be fetched into the instance.
    pub legacy_fml: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProfile {
    pub(crate) libraries: Vec<Arc<Library>>,
    pub(crate) traits: BTreeSet<String>,
    pub(crate) main_class: String,
    pub(crate) minecraft_arguments: String,
    pub(crate) tweakers: Vec<String>,
    pub(crate) applet_class: String,
    pub(crate) assets: String,
    pub(crate) jar_mods: Vec<JarMod>,
    pub(crate) folders: BTreeMap<String, Vec<String>>,
    pub(crate) minecraft_version: String,
    pub(crate) steps: PostMergeSteps,
}

fn set_if_present(target: &mut String, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        *target = value.to_string();
    }
}

fn apply_libraries(libs: &mut Vec<Arc<Library>>, patch: &VersionPatch) {
    if let Some(overrides) = &patch.override_libs {
        *libs = overrides.clone();
    } else {
        let mut prepended = Vec::new();
        for lib in &patch.add_libs {
            match lib.insert_mode() {
                InsertMode::Append => libs.push(Arc::clone(lib)),
                InsertMode::Prepend => prepended.push(Arc::clone(lib)),
                InsertMode::Replace => {
                    let identity = lib.identity();
                    match libs.iter().position(|l| l.identity() == identity) {
                        Some(idx) => libs[idx] = Arc::clone(lib),
                        None => libs.push(Arc::clone(lib)),
                    }
                }
            }
        }
        if !prepended.is_empty() {
            libs.splice(0..0, prepended);
        }
    }

    for name in &patch.remove_libs {
        let identity = artifact_prefix_of(name);
        libs.retain(|l| l.identity() != identity);
    }
}

impl ResolvedProfile {
    /// Fold `patches` in sequence order. Pure: the same sequence always
    /// yields the same result.
    pub fn merge(patches: &[VersionPatch]) -> LauncherResult<Self> {
        let mut resolved = Self::default();
        if let Some(base) = patches.iter().find(|p| p.file_id == MINECRAFT_UID) {
            resolved.minecraft_version = base.version.clone();
        }

        for patch in patches {
            resolved.apply(patch)?;
        }
        Ok(resolved)
    }

    fn apply(&mut self, patch: &VersionPatch) -> LauncherResult<()> {
        if let Some(required) = patch.mc_version.as_deref().filter(|v| !v.is_empty()) {
            if !self.minecraft_version.is_empty() && required != self.minecraft_version {
                return Err(LauncherError::VersionMismatch {
                    patch: patch.file_id.clone(),
                    required: required.to_string(),
                    actual: self.minecraft_version.clone(),
                });
            }
        }

        apply_libraries(&mut self.libraries, patch);

        set_if_present(&mut self.main_class, &patch.main_class);
        set_if_present(&mut self.applet_class, &patch.applet_class);
        set_if_present(&mut self.assets, &patch.assets);
        set_if_present(&mut self.minecraft_arguments, &patch.minecraft_arguments);

        self.tweakers.extend(patch.tweakers.iter().cloned());
        self.traits.extend(patch.traits.iter().cloned());
        self.jar_mods.extend(patch.jar_mods.iter().cloned());
        for (path, kinds) in &patch.folders {
            self.folders.insert(path.clone(), kinds.clone());
        }
        Ok(())
    }

    /// Derive the optional steps from the merged state.
    pub(crate) fn derive_steps(&mut self, patches: &[VersionPatch]) {
        let forge_present = patches.iter().any(|p| p.file_id == FORGE_UID);
        self.steps = PostMergeSteps {
            build_jar: !self.jar_mods.is_empty(),
            legacy_fml: forge_present && self.traits.contains(LEGACY_FML_TRAIT),
        };
    }

    /// Every accumulated library, native and normal, active or not.
    pub fn libraries(&self) -> &[Arc<Library>] {
        &self.libraries
    }

    /// Java libraries that belong on the classpath in `ctx`.
    pub fn active_normal_libs(&self, ctx: &RuleContext) -> Vec<Arc<Library>> {
        self.libraries
            .iter()
            .filter(|lib| !lib.is_native() && lib.is_active(ctx))
            .cloned()
            .collect()
    }

    /// Native libraries that must be extracted for the process in `ctx`.
    pub fn active_native_libs(&self, ctx: &RuleContext) -> Vec<Arc<Library>> {
        self.libraries
            .iter()
            .filter(|lib| lib.is_native() && lib.is_active(ctx))
            .cloned()
            .collect()
    }

    pub fn traits(&self) -> &BTreeSet<String> {
        &self.traits
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(name)
    }

    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    pub fn minecraft_arguments(&self) -> &str {
        &self.minecraft_arguments
    }

    pub fn tweakers(&self) -> &[String] {
        &self.tweakers
    }

    pub fn applet_class(&self) -> &str {
        &self.applet_class
    }

    pub fn assets(&self) -> &str {
        &self.assets
    }

    pub fn jar_mods(&self) -> &[JarMod] {
        &self.jar_mods
    }

    pub fn folders(&self) -> &BTreeMap<String, Vec<String>> {
        &self.folders
    }

    /// Version of the base game patch, empty when there is none.
    pub fn minecraft_version(&self) -> &str {
        &self.minecraft_version
    }

    pub fn steps(&self) -> PostMergeSteps {
        self.steps
    }

    /// Human-readable dump of the effective configuration in `ctx`.
    pub fn summary(&self, ctx: &RuleContext) -> serde_json::Value {
        let names = |libs: Vec<Arc<Library>>| {
            libs.iter().map(|l| l.name().to_string()).collect::<Vec<_>>()
        };
        json!({
            "minecraftVersion": self.minecraft_version,
            "mainClass": self.main_class,
            "appletClass": self.applet_class,
            "assets": self.assets,
            "minecraftArguments": self.minecraft_arguments,
            "tweakers": self.tweakers,
            "traits": self.traits,
            "jarMods": self.jar_mods,
            "libraries": names(self.active_normal_libs(ctx)),
            "natives": names(self.active_native_libs(ctx)),
            "buildJar": self.steps.build_jar,
            "legacyFml": self.steps.legacy_fml,
        })
    }
}
