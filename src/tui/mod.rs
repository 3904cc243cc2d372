//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - Patient form with numeric inputs and constrained choice selectors
//! - Prediction result with the 3-year RFS headline and survival chart

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
