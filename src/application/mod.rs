//! Application layer: Use cases and services.
//!
//! Orchestrates domain logic with the model port to implement the single
//! use case of the application: predict recurrence-free survival.

mod ensemble;
mod prediction;

pub use ensemble::ModelEnsemble;
pub use prediction::PredictionService;
