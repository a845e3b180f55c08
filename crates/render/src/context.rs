use glam::{Mat4, Vec4};
use std::fmt;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

gpu_handle!(
    /// A buffer owned by a [`GpuContext`].
    BufferHandle
);
gpu_handle!(
    /// A compiled shader stage owned by a [`GpuContext`].
    ShaderHandle
);
gpu_handle!(
    /// A linked program owned by a [`GpuContext`].
    ProgramHandle
);
gpu_handle!(
    /// A texture owned by a [`GpuContext`].
    TextureHandle
);
gpu_handle!(
    /// Location of a vertex attribute inside a linked program.
    AttributeLocation
);
gpu_handle!(
    /// Location of a uniform inside a linked program.
    UniformLocation
);

/// What a buffer is bound as when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors reported by a context while building programs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GpuError {
    #[error("unable to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("unable to link program: {log}")]
    Link { log: String },
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// `None` for a zero side or if `rgba` is not exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        (width > 0 && height > 0 && rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// A single opaque white pixel.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }

    /// Reverse row order in place.
    pub fn flip_rows(&mut self) {
        let stride = self.width as usize * 4;
        let rows = self.height as usize;
        for row in 0..rows / 2 {
            let (top, bottom) = self.rgba.split_at_mut((rows - 1 - row) * stride);
            top[row * stride..(row + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }
}

/// The drawing surface the engine core renders through.
///
/// This is the whole GPU boundary: entities, the program cache and the render
/// loop only ever talk to a `dyn GpuContext`. Handles are plain ids, so nothing
/// outside the context keeps GPU objects alive.
pub trait GpuContext {
    /// Allocate an empty buffer.
    fn create_buffer(&mut self, usage: BufferUsage) -> BufferHandle;

    /// Replace the contents of a buffer.
    fn upload_buffer(&mut self, buffer: BufferHandle, contents: &[u8]);

    fn compile_shader(&mut self, stage: ShaderStage, source: &str)
    -> Result<ShaderHandle, GpuError>;

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, GpuError>;

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation>;

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn use_program(&mut self, program: ProgramHandle);

    /// Feed `buffer` into an attribute, `components` floats per vertex.
    fn bind_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferHandle,
        components: u32,
    );

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4);

    /// Upload pixels into a new texture.
    fn create_texture(&mut self, image: &TextureImage) -> TextureHandle;

    /// Whether `texture` names a live texture of this context.
    fn is_texture(&self, texture: TextureHandle) -> bool;

    /// Bind `texture` to a texture unit and point the sampler uniform at it.
    fn bind_texture(&mut self, unit: u32, sampler: UniformLocation, texture: TextureHandle);

    fn drawing_buffer_size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    /// Clear color and depth for the next frame.
    fn clear(&mut self);

    /// Draw `count` indices from `indices` as a triangle list.
    fn draw_indexed_triangles(&mut self, indices: BufferHandle, count: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_image_rejects_bad_length() {
        assert!(TextureImage::new(2, 2, vec![0; 15]).is_none());
        assert!(TextureImage::new(0, 2, vec![]).is_none());
        assert!(TextureImage::new(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn flip_rows_reverses_row_order() {
        #[rustfmt::skip]
        let mut image = TextureImage::new(1, 3, vec![
            1, 1, 1, 1,
            2, 2, 2, 2,
            3, 3, 3, 3,
        ]).unwrap();
        image.flip_rows();
        assert_eq!(&image.rgba[..4], &[3, 3, 3, 3]);
        assert_eq!(&image.rgba[4..8], &[2, 2, 2, 2]);
        assert_eq!(&image.rgba[8..], &[1, 1, 1, 1]);
    }

    #[test]
    fn gpu_error_messages() {
        let err = GpuError::Compile {
            stage: ShaderStage::Fragment,
            log: "bad token".into(),
        };
        assert_eq!(err.to_string(), "unable to compile fragment shader: bad token");
    }
}
