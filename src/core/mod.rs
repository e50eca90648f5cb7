// ─── Patchwork Core ───
// Layered version profile resolution for game instances.
//
// Architecture:
//   core/
//     version/    — Patch documents, libraries, rules, order, catalog
//     profile/    — Merge engine + resolved snapshot
//     strategy/   — How an instance kind loads and persists patches
//     instance/   — Instance model, settings overrides, CRUD manager
//     maven/      — Artifact coordinates and repository paths
//     downloader/ — Concurrent downloads with SHA-1 validation
//     update/     — Library fetch, modded jar, legacy FML libraries
//     state/      — Application paths and global settings

pub mod downloader;
pub mod error;
pub mod http;
pub mod instance;
pub mod maven;
pub mod profile;
pub mod state;
pub mod strategy;
pub mod update;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;
