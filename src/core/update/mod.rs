pub mod jarmods;
pub mod libraries;
pub mod task;

pub use jarmods::build_modded_jar;
pub use libraries::{plan_library_downloads, LibraryPlan};
pub use task::{update_game, UpdateContext, UpdateReport};
