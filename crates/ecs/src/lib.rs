//! Capability components and the entity composer.
//!
//! An entity is built once from an ordered list of boxed capabilities. Each
//! capability may contribute a render step, an update step, the terminal draw
//! step and some properties.
//!
//! # Invariants
//! - Exactly one composed capability supplies the terminal draw step.
//! - Render steps run in composition order; that order fixes the transform order.
//! - Update steps take elapsed time in seconds.

mod capabilities;
mod capability;
mod entity;
mod properties;

pub use capabilities::{Colorable, Meshable, Movable, Positionable, Rotatable, Texturable};
pub use capability::{
    Capability, CapabilityKind, ConfigError, FinishStep, Frame, RenderStep, UpdateStep,
};
pub use entity::{Entity, compose};
pub use properties::{EntityProperties, Mesh, Motion, Orientation, UvMap};
