mod artifact;

pub use artifact::{artifact_prefix_of, MavenArtifact};

/// Well-known Maven repositories used by the Minecraft ecosystem.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
