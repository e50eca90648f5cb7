pub mod manager;
pub mod model;
pub mod settings;

pub use manager::InstanceManager;
pub use model::{Instance, InstanceConfig, InstanceDirs, InstanceKind};
pub use settings::{EffectiveSettings, InstanceSettings};
