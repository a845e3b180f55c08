//! wgpu backend for the cubescape GPU context.
//!
//! # Invariants
//! - Locations follow the standard attribute and uniform order, so every
//!   program built here exposes the same interface as the headless context.
//! - Nothing is drawn until [`WgpuContext::present`]; a frame is one render pass.

mod context;
mod uniforms;

pub use context::{ContextError, WgpuContext};
pub use uniforms::{SLOT_STRIDE, UniformBlock};
