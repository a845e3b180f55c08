//! GPU context boundary and program cache.
//!
//! # Invariants
//! - Everything above this crate talks to the GPU only through [`GpuContext`].
//! - A program name is compiled at most once; failures are cached values.
//! - Handles are plain ids: dropping an entity never touches the context.

mod context;
mod headless;
mod program;
mod shaders;

pub use context::{
    AttributeLocation, BufferHandle, BufferUsage, GpuContext, GpuError, ProgramHandle,
    ShaderHandle, ShaderStage, TextureHandle, TextureImage, UniformLocation,
};
pub use headless::{GpuCall, HeadlessContext};
pub use program::{ProgramCache, ProgramError, ProgramInfo, ProgramSource, names};
pub use shaders::{SIMPLE_PROGRAM, simple_program};

/// A program cache with the built-in programs registered.
pub fn default_programs() -> ProgramCache {
    ProgramCache::new().with_program(SIMPLE_PROGRAM, simple_program())
}
