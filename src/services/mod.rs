pub mod artifacts;
pub mod providers;
pub mod recommendations;

pub use artifacts::{ArtifactLoader, ArtifactSpec};
pub use providers::{MetadataProvider, TmdbProvider};
