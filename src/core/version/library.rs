// ─── Library Descriptor ───
// One dependency contributed by a patch: coordinate, where it is fetched
// from, where it is stored, and when it applies.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::LauncherError;
use crate::core::maven::{MavenArtifact, MOJANG_LIBRARIES};

use super::rules::{self, Rule, RuleContext, RuleResult};

/// Placeholder expanded to the pointer width (`32`/`64`) in native classifiers.
pub const ARCH_PLACEHOLDER: &str = "${arch}";

/// Architectures every `${arch}` template is expanded for.
pub const SUPPORTED_ARCH_BITS: [&str; 2] = ["32", "64"];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LibraryHint {
    /// Fetched from a repository.
    #[default]
    Remote,
    /// Provided on disk by the user or an external tool; never downloaded.
    Local,
}

/// Where an added library goes relative to what earlier patches accumulated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsertMode {
    #[default]
    Append,
    Prepend,
    /// Swap out the accumulated library with the same `group:artifact`.
    Replace,
}

/// On-disk shape of a library entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLibrary {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(
        default,
        rename = "MMC-absoluteUrl",
        skip_serializing_if = "Option::is_none"
    )]
    absolute_url: Option<String>,
    #[serde(default, rename = "MMC-hint", skip_serializing_if = "Option::is_none")]
    hint: Option<LibraryHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    insert: Option<InsertMode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    natives: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rules: Option<Vec<Rule>>,
}

/// A library descriptor. Immutable once parsed; shared between the patch
/// that declared it and any resolved profile through `Arc<Library>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLibrary", into = "RawLibrary")]
pub struct Library {
    raw_name: String,
    artifact: MavenArtifact,
    base_url: Option<String>,
    absolute_url: Option<String>,
    hint: LibraryHint,
    insert: InsertMode,
    natives: BTreeMap<String, String>,
    rules: Option<Vec<Rule>>,
}

/// A concrete file of a library after `${arch}` expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryArtifactFile {
    /// Path relative to the libraries directory, `/` separated.
    pub storage_path: String,
    pub url: String,
}

impl TryFrom<RawLibrary> for Library {
    type Error = LauncherError;

    fn try_from(raw: RawLibrary) -> Result<Self, Self::Error> {
        let artifact = MavenArtifact::parse(&raw.name)?;
        Ok(Self {
            raw_name: raw.name,
            artifact,
            base_url: raw.url,
            absolute_url: raw.absolute_url,
            hint: raw.hint.unwrap_or_default(),
            insert: raw.insert.unwrap_or_default(),
            natives: raw.natives,
            rules: raw.rules,
        })
    }
}

impl From<Library> for RawLibrary {
    fn from(lib: Library) -> Self {
        Self {
            name: lib.raw_name,
            url: lib.base_url,
            absolute_url: lib.absolute_url,
            hint: (lib.hint != LibraryHint::Remote).then_some(lib.hint),
            insert: (lib.insert != InsertMode::Append).then_some(lib.insert),
            natives: lib.natives,
            rules: lib.rules,
        }
    }
}

impl Library {
    pub fn new(name: &str) -> Result<Self, LauncherError> {
        Self::try_from(RawLibrary {
            name: name.to_string(),
            url: None,
            absolute_url: None,
            hint: None,
            insert: None,
            natives: BTreeMap::new(),
            rules: None,
        })
    }

    pub fn with_insert(mut self, insert: InsertMode) -> Self {
        self.insert = insert;
        self
    }

    pub fn with_hint(mut self, hint: LibraryHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_native(mut self, os: &str, classifier: &str) -> Self {
        self.natives.insert(os.to_string(), classifier.to_string());
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.raw_name
    }

    pub fn artifact(&self) -> &MavenArtifact {
        &self.artifact
    }

    /// `group:artifact`, what replace and remove operations match on.
    pub fn identity(&self) -> String {
        self.artifact.artifact_prefix()
    }

    pub fn hint(&self) -> LibraryHint {
        self.hint
    }

    pub fn insert_mode(&self) -> InsertMode {
        self.insert
    }

    /// Native libraries carry a per-OS classifier map. This never depends on
    /// where the library ends up in a merged profile.
    pub fn is_native(&self) -> bool {
        !self.natives.is_empty()
    }

    pub fn native_classifier(&self, os: &str) -> Option<&str> {
        self.natives.get(os).map(String::as_str)
    }

    /// Whether the library applies in the given context. Libraries without
    /// rules always apply; natives additionally need a classifier for the OS.
    pub fn is_active(&self, ctx: &RuleContext) -> bool {
        let allowed = match &self.rules {
            Some(rules) if !rules.is_empty() => {
                rules::evaluate(rules, ctx) == RuleResult::Allow
            }
            _ => true,
        };
        if self.is_native() {
            return allowed && self.natives.contains_key(&ctx.os);
        }
        allowed
    }

    /// Storage path template; may still contain [`ARCH_PLACEHOLDER`].
    pub fn storage_path(&self, os: &str) -> String {
        match self.native_classifier(os) {
            Some(classifier) => self.artifact.with_classifier(classifier).repository_path(),
            None => self.artifact.repository_path(),
        }
    }

    /// Download URL template; may still contain [`ARCH_PLACEHOLDER`].
    pub fn download_url(&self, os: &str) -> String {
        if let Some(url) = &self.absolute_url {
            return url.clone();
        }
        let base = self.base_url.as_deref().unwrap_or(MOJANG_LIBRARIES);
        format!("{}/{}", base.trim_end_matches('/'), self.storage_path(os))
    }

    /// Concrete files for the OS. A template with an architecture
    /// placeholder yields exactly one file per supported architecture.
    pub fn files(&self, os: &str) -> Vec<LibraryArtifactFile> {
        let storage = self.storage_path(os);
        let url = self.download_url(os);
        if !storage.contains(ARCH_PLACEHOLDER) {
            return vec![LibraryArtifactFile {
                storage_path: storage,
                url,
            }];
        }
        SUPPORTED_ARCH_BITS
            .iter()
            .map(|bits| LibraryArtifactFile {
                storage_path: storage.replace(ARCH_PLACEHOLDER, bits),
                url: url.replace(ARCH_PLACEHOLDER, bits),
            })
            .collect()
    }

    /// Storage paths of files missing under `libraries_dir`.
    pub fn missing_files(&self, libraries_dir: &Path, os: &str) -> Vec<String> {
        self.files(os)
            .into_iter()
            .map(|file| file.storage_path)
            .filter(|storage| !libraries_dir.join(storage).exists())
            .collect()
    }
}
