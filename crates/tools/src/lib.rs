//! Developer tooling: read-only scene inspection.
//!
//! # Invariants
//! - Tools never mutate the scene.

mod inspector;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};
