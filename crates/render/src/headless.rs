use crate::context::{
    AttributeLocation, BufferHandle, BufferUsage, GpuContext, GpuError, ProgramHandle,
    ShaderHandle, ShaderStage, TextureHandle, TextureImage, UniformLocation,
};
use crate::program::names;
use glam::{Mat4, Vec4};
use std::collections::{BTreeMap, BTreeSet};

/// One call made against a [`HeadlessContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateBuffer { buffer: BufferHandle, usage: BufferUsage },
    UploadBuffer { buffer: BufferHandle, bytes: usize },
    CompileShader { stage: ShaderStage, ok: bool },
    LinkProgram { ok: bool },
    UseProgram(ProgramHandle),
    BindAttribute {
        location: AttributeLocation,
        buffer: BufferHandle,
        components: u32,
    },
    SetMat4 { location: UniformLocation, value: Mat4 },
    SetVec4 { location: UniformLocation, value: Vec4 },
    CreateTexture { texture: TextureHandle, width: u32, height: u32 },
    BindTexture { unit: u32, texture: TextureHandle },
    Resize { width: u32, height: u32 },
    Clear,
    DrawIndexed { indices: BufferHandle, count: u32 },
}

/// GPU context that draws nothing and records every call.
///
/// Used by the command-line host and by tests. Shader "compilation" accepts
/// any non-blank source except one containing an `#error` directive, whose
/// remaining text becomes the compile log.
#[derive(Debug)]
pub struct HeadlessContext {
    size: (u32, u32),
    next_id: u32,
    buffers: BTreeMap<BufferHandle, Vec<u8>>,
    shaders: BTreeSet<ShaderHandle>,
    programs: BTreeSet<ProgramHandle>,
    textures: BTreeSet<TextureHandle>,
    fail_link: Option<String>,
    calls: Vec<GpuCall>,
}

impl HeadlessContext {
    /// Context reporting a `width` x `height` drawing buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            next_id: 1,
            buffers: BTreeMap::new(),
            shaders: BTreeSet::new(),
            programs: BTreeSet::new(),
            textures: BTreeSet::new(),
            fail_link: None,
            calls: Vec::new(),
        }
    }

    /// Make the next `link_program` call fail with `log`.
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.fail_link = Some(log.into());
    }

    /// Drop a texture, as a lost context would.
    pub fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GpuCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Contents last uploaded into `buffer`.
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Every `DrawIndexed` call recorded so far.
    pub fn draws(&self) -> Vec<(BufferHandle, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::DrawIndexed { indices, count } => Some((*indices, *count)),
                _ => None,
            })
            .collect()
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GpuContext for HeadlessContext {
    fn create_buffer(&mut self, usage: BufferUsage) -> BufferHandle {
        let buffer = BufferHandle(self.next());
        self.buffers.insert(buffer, Vec::new());
        self.calls.push(GpuCall::CreateBuffer { buffer, usage });
        buffer
    }

    fn upload_buffer(&mut self, buffer: BufferHandle, contents: &[u8]) {
        if let Some(data) = self.buffers.get_mut(&buffer) {
            data.clear();
            data.extend_from_slice(contents);
        }
        self.calls.push(GpuCall::UploadBuffer {
            buffer,
            bytes: contents.len(),
        });
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, GpuError> {
        let failure = if source.trim().is_empty() {
            Some("empty shader source".to_string())
        } else {
            source
                .lines()
                .find_map(|line| line.trim().strip_prefix("#error"))
                .map(|rest| rest.trim().to_string())
        };
        self.calls.push(GpuCall::CompileShader {
            stage,
            ok: failure.is_none(),
        });
        match failure {
            Some(log) => Err(GpuError::Compile { stage, log }),
            None => {
                let shader = ShaderHandle(self.next());
                self.shaders.insert(shader);
                Ok(shader)
            }
        }
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, GpuError> {
        let failure = self.fail_link.take().or_else(|| {
            (!self.shaders.contains(&vertex) || !self.shaders.contains(&fragment))
                .then(|| "unknown shader handle".to_string())
        });
        self.calls.push(GpuCall::LinkProgram {
            ok: failure.is_none(),
        });
        match failure {
            Some(log) => Err(GpuError::Link { log }),
            None => {
                let program = ProgramHandle(self.next());
                self.programs.insert(program);
                Ok(program)
            }
        }
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        if !self.programs.contains(&program) {
            return None;
        }
        names::STANDARD_ATTRIBUTES
            .iter()
            .position(|n| *n == name)
            .map(|i| AttributeLocation(i as u32))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if !self.programs.contains(&program) {
            return None;
        }
        names::STANDARD_UNIFORMS
            .iter()
            .position(|n| *n == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn bind_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferHandle,
        components: u32,
    ) {
        self.calls.push(GpuCall::BindAttribute {
            location,
            buffer,
            components,
        });
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.calls.push(GpuCall::SetMat4 {
            location,
            value: *value,
        });
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        self.calls.push(GpuCall::SetVec4 { location, value });
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureHandle {
        let texture = TextureHandle(self.next());
        self.textures.insert(texture);
        self.calls.push(GpuCall::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        texture
    }

    fn is_texture(&self, texture: TextureHandle) -> bool {
        self.textures.contains(&texture)
    }

    fn bind_texture(&mut self, unit: u32, _sampler: UniformLocation, texture: TextureHandle) {
        self.calls.push(GpuCall::BindTexture { unit, texture });
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.calls.push(GpuCall::Resize { width, height });
    }

    fn clear(&mut self) {
        self.calls.push(GpuCall::Clear);
    }

    fn draw_indexed_triangles(&mut self, indices: BufferHandle, count: u32) {
        self.calls.push(GpuCall::DrawIndexed { indices, count });
    }
}
