mod engine;
mod resolved;

pub use engine::{MoveDirection, Profile};
pub use resolved::{
    PostMergeSteps, ResolvedProfile, FORGE_UID, LEGACY_FML_TRAIT, LWJGL_UID, MINECRAFT_UID,
};
