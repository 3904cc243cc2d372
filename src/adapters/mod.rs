//! Adapters layer: Concrete implementations of ports.
//!
//! - `forest`: Random survival forest, the model type shipped in artifacts
//! - `artifact`: Manifest-checked loading of an ensemble from disk

pub mod artifact;
pub mod forest;

pub use artifact::{load_ensemble, ArtifactError};
pub use forest::SurvivalForest;
