//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary between
//! the prediction logic and the externally trained model artifact.

mod survival_model;

pub use survival_model::{ModelError, SurvivalModel};
