//! Data models for the Sunny tour site.
//!
//! These models match the frontend TypeScript interfaces for seamless interoperability.

mod content;
mod tour;
mod weather;

pub use content::*;
pub use tour::*;
pub use weather::*;
