//! Army composition: unit catalog and immutable army values

pub mod catalog;
pub mod composition;

pub use catalog::{tech_factor, UnitCatalog, UnitSpec};
pub use composition::{Army, StackOrder, TechLevels, UnitStack};
