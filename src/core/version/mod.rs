pub mod catalog;
pub mod library;
pub mod order;
pub mod patch;
pub mod resource;
pub mod rules;

pub use catalog::{FmlLibrary, InMemoryCatalog, MetaCacheCatalog, VersionCatalog};
pub use library::{InsertMode, Library, LibraryArtifactFile, LibraryHint, ARCH_PLACEHOLDER};
pub use patch::{parse_patch, read_patch_file, write_patch_file, JarMod, VersionPatch};
pub use resource::{Resource, ResourceKey};
pub use rules::{Rule, RuleAction, RuleContext, RuleResult};
