// ─── Profile ───
// The ordered patch stack of an instance and its merged configuration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::strategy::ProfileStrategy;
use crate::core::version::VersionPatch;

use super::resolved::ResolvedProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Lifecycle of the effective configuration. Any change to the patch
/// sequence drops back to `Stale`.
#[derive(Debug, Default)]
enum Effective {
    #[default]
    Stale,
    Merged(ResolvedProfile),
    Finalized(Arc<ResolvedProfile>),
}

#[derive(Debug, Default)]
pub struct Profile {
    patches: Vec<VersionPatch>,
    effective: Effective,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Patch sequence ──────────────────────────────────

    /// Add a patch at the end of the sequence. Uniqueness of `file_id` is
    /// the caller's responsibility.
    pub fn append_patch(&mut self, patch: VersionPatch) {
        self.patches.push(patch);
        self.effective = Effective::Stale;
    }

    /// Drop every patch and all effective state.
    pub fn clear_patches(&mut self) {
        self.patches.clear();
        self.effective = Effective::Stale;
    }

    /// Clear, let `strategy` load the patches, merge and finalize.
    ///
    /// On failure the profile is left cleared.
    pub fn reload(&mut self, strategy: &ProfileStrategy) -> LauncherResult<()> {
        self.clear_patches();

        let loaded = strategy.load(self).and_then(|()| self.reapply());
        if let Err(e) = loaded {
            self.clear_patches();
            return Err(e);
        }
        self.finalize();

        info!(
            "Profile reloaded with {} patches ({})",
            self.patches.len(),
            strategy.kind()
        );
        Ok(())
    }

    /// Fold the current patch sequence into the effective configuration.
    pub fn reapply(&mut self) -> LauncherResult<()> {
        match ResolvedProfile::merge(&self.patches) {
            Ok(merged) => {
                debug!(
                    "Merged {} patches into {} libraries",
                    self.patches.len(),
                    merged.libraries().len()
                );
                self.effective = Effective::Merged(merged);
                Ok(())
            }
            Err(e) => {
                self.effective = Effective::Stale;
                Err(e)
            }
        }
    }

    /// Derive the state that needs the complete merge. A no-op when already
    /// finalized or when nothing has been merged.
    pub fn finalize(&mut self) {
        self.effective = match std::mem::take(&mut self.effective) {
            Effective::Merged(mut merged) => {
                merged.derive_steps(&self.patches);
                Effective::Finalized(Arc::new(merged))
            }
            other => other,
        };
    }

    /// Immutable snapshot of the effective configuration for launch and
    /// download consumers.
    pub fn resolved(&self) -> LauncherResult<Arc<ResolvedProfile>> {
        match &self.effective {
            Effective::Finalized(resolved) => Ok(Arc::clone(resolved)),
            _ => Err(LauncherError::ProfileStale),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.effective, Effective::Finalized(_))
    }

    // ── Reordering / removal ────────────────────────────

    /// Swap patch `index` with its neighbour in `direction`. Both must be
    /// movable. The caller reapplies and persists the order afterwards.
    pub fn move_patch(&mut self, index: usize, direction: MoveDirection) -> LauncherResult<()> {
        let invalid = |reason: &str| LauncherError::InvalidMove {
            index,
            reason: reason.to_string(),
        };

        if index >= self.patches.len() {
            return Err(invalid("no such patch"));
        }
        let other = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|i| *i < self.patches.len()),
        }
        .ok_or_else(|| invalid("already at the edge of the list"))?;

        if !self.patches[index].is_movable() || !self.patches[other].is_movable() {
            return Err(invalid("builtin patches cannot be reordered"));
        }

        self.patches.swap(index, other);
        self.effective = Effective::Stale;
        Ok(())
    }

    pub fn can_remove(&self, index: usize) -> bool {
        self.patches.get(index).is_some_and(VersionPatch::is_movable)
    }

    /// Remove patch `index` after `strategy` cleaned up its storage.
    /// Returns `false` when the patch is protected or the strategy refuses.
    pub fn remove(&mut self, index: usize, strategy: &ProfileStrategy) -> LauncherResult<bool> {
        if !self.can_remove(index) {
            return Ok(false);
        }
        if !strategy.remove_patch(&self.patches[index])? {
            return Ok(false);
        }
        let removed = self.patches.remove(index);
        self.effective = Effective::Stale;
        info!("Removed patch {}", removed.file_id);
        Ok(true)
    }

    pub fn remove_by_id(&mut self, id: &str, strategy: &ProfileStrategy) -> LauncherResult<bool> {
        match self.index_of(id) {
            Some(index) => self.remove(index, strategy),
            None => Ok(false),
        }
    }

    // ── Queries ─────────────────────────────────────────

    pub fn patches(&self) -> &[VersionPatch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.file_id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn version_patch(&self, id: &str) -> Option<&VersionPatch> {
        self.patches.iter().find(|p| p.file_id == id)
    }

    /// # Panics
    /// When `index` is out of range.
    pub fn version_patch_at(&self, index: usize) -> &VersionPatch {
        &self.patches[index]
    }

    /// # Panics
    /// When `index` is out of range.
    pub fn version_file_id(&self, index: usize) -> &str {
        &self.patches[index].file_id
    }

    /// Ids of the user-orderable patches, in sequence order.
    pub fn current_order(&self) -> Vec<String> {
        self.patches
            .iter()
            .filter(|p| p.is_movable())
            .map(|p| p.file_id.clone())
            .collect()
    }

    /// An order value above every patch currently loaded. Fails when a
    /// patch already sits at `i32::MAX`.
    pub fn free_order_number(&self) -> LauncherResult<i32> {
        match self.patches.iter().map(|p| p.order).max() {
            None => Ok(0),
            Some(max) => max
                .checked_add(1)
                .map(|next| next.max(0))
                .ok_or(LauncherError::OrderExhausted(max)),
        }
    }
}
