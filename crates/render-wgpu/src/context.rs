use crate::uniforms::{
    BLOCK_SIZE, SLOT_STRIDE, UniformBlock, UniformTarget, attribute_slot, pack_slots,
    slot_capacity, uniform_target,
};
use cubescape_render::{
    AttributeLocation, BufferHandle, BufferUsage, GpuContext, GpuError, ProgramHandle,
    ShaderHandle, ShaderStage, TextureHandle, TextureImage, UniformLocation, names,
};
use glam::{Mat4, Vec4};
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;
/// Largest vertex count a u16 index buffer can address.
const MAX_VERTICES: u64 = u16::MAX as u64 + 1;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 0,
}];
const UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 1,
}];

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("unable to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("unable to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("unable to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

struct GpuBuffer {
    usage: BufferUsage,
    buffer: Option<wgpu::Buffer>,
}

/// State set by bind/uniform calls, consumed by the next draw.
#[derive(Default)]
struct Bindings {
    program: Option<ProgramHandle>,
    position: Option<BufferHandle>,
    uv: Option<BufferHandle>,
    texture: Option<TextureHandle>,
    uniforms: UniformBlock,
}

struct DrawCall {
    program: ProgramHandle,
    position: BufferHandle,
    uv: Option<BufferHandle>,
    texture: Option<TextureHandle>,
    indices: BufferHandle,
    count: u32,
}

#[derive(Default)]
struct PendingFrame {
    clear: bool,
    draws: Vec<DrawCall>,
    blocks: Vec<UniformBlock>,
}

/// [`GpuContext`] backed by a wgpu device rendering into a window surface.
///
/// Calls made during a frame are recorded into a draw list with one uniform
/// slot per draw; [`WgpuContext::present`] replays the list in a single render
/// pass. Texture and texture-coordinate bindings reset after every draw, so an
/// untextured entity drawn after a textured one falls back to plain color.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    adapter_info: wgpu::AdapterInfo,
    depth: wgpu::TextureView,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_slots: u32,
    white: wgpu::BindGroup,
    fallback_uvs: wgpu::Buffer,
    next_id: u32,
    buffers: BTreeMap<BufferHandle, GpuBuffer>,
    shaders: BTreeMap<ShaderHandle, (ShaderStage, wgpu::ShaderModule)>,
    programs: BTreeMap<ProgramHandle, wgpu::RenderPipeline>,
    textures: BTreeMap<TextureHandle, wgpu::BindGroup>,
    bound: Bindings,
    frame: PendingFrame,
}

impl WgpuContext {
    /// Open a device for `target` and configure its surface at `width` x `height`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(ContextError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubescape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(ContextError::NoSurfaceFormat)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(BLOCK_SIZE),
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        // Nearest filtering, clamped: textures are small and not mipmapped.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_slots = slot_capacity(0, 1);
        let (uniform_buffer, uniform_bind_group) =
            create_uniforms(&device, &uniform_layout, uniform_slots);
        let white = texture_bind_group(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &TextureImage::white(),
        );
        let fallback_uvs = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fallback_uv_buffer"),
            size: MAX_VERTICES * 8,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });
        let depth = create_depth_texture(&device, config.width, config.height);

        let adapter_info = adapter.get_info();
        tracing::info!(
            backend = adapter_info.backend.to_str(),
            adapter = %adapter_info.name,
            ?format,
            "GPU context ready"
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            adapter_info,
            depth,
            pipeline_layout,
            uniform_layout,
            texture_layout,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            uniform_slots,
            white,
            fallback_uvs,
            next_id: 1,
            buffers: BTreeMap::new(),
            shaders: BTreeMap::new(),
            programs: BTreeMap::new(),
            textures: BTreeMap::new(),
            bound: Bindings::default(),
            frame: PendingFrame::default(),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Color format the surface was configured with.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Adapter the device was created on.
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Draws recorded since the last [`present`](Self::present).
    pub fn pending_draws(&self) -> usize {
        self.frame.draws.len()
    }

    /// Replay the recorded frame into the surface, let `overlay` encode extra
    /// passes on top, then present.
    ///
    /// Returns `Ok(false)` when the surface was lost, outdated or timed out;
    /// the frame is dropped and the surface reconfigured where needed.
    pub fn present(
        &mut self,
        overlay: impl FnOnce(
            &wgpu::Device,
            &wgpu::Queue,
            &mut wgpu::CommandEncoder,
            &wgpu::TextureView,
        ),
    ) -> Result<bool, ContextError> {
        let frame = std::mem::take(&mut self.frame);
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timed out, frame dropped");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        self.reserve_uniform_slots(frame.blocks.len() as u32);
        if !frame.blocks.is_empty() {
            self.queue
                .write_buffer(&self.uniform_buffer, 0, &pack_slots(&frame.blocks));
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let (color_load, depth_load) = if frame.clear {
                (wgpu::LoadOp::Clear(CLEAR_COLOR), wgpu::LoadOp::Clear(1.0))
            } else {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            for (slot, draw) in frame.draws.iter().enumerate() {
                self.encode_draw(&mut pass, slot as u32, draw);
            }
        }

        overlay(&self.device, &self.queue, &mut encoder, &view);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(true)
    }

    fn encode_draw(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32, draw: &DrawCall) {
        let Some(pipeline) = self.programs.get(&draw.program) else {
            return;
        };
        let (Some(position), Some(indices)) =
            (self.live_buffer(draw.position), self.live_buffer(draw.indices))
        else {
            return;
        };
        let uvs = draw
            .uv
            .and_then(|uv| self.live_buffer(uv))
            .unwrap_or(&self.fallback_uvs);
        let texture = draw
            .texture
            .and_then(|t| self.textures.get(&t))
            .unwrap_or(&self.white);

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[slot * SLOT_STRIDE as u32]);
        pass.set_bind_group(1, texture, &[]);
        pass.set_vertex_buffer(0, position.slice(..));
        pass.set_vertex_buffer(1, uvs.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..draw.count, 0, 0..1);
    }

    fn live_buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(&handle)?.buffer.as_ref()
    }

    fn reserve_uniform_slots(&mut self, needed: u32) {
        let capacity = slot_capacity(self.uniform_slots, needed);
        if capacity == self.uniform_slots {
            return;
        }
        tracing::debug!(from = self.uniform_slots, to = capacity, "growing uniform buffer");
        let (buffer, bind_group) = create_uniforms(&self.device, &self.uniform_layout, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_slots = capacity;
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GpuContext for WgpuContext {
    fn create_buffer(&mut self, usage: BufferUsage) -> BufferHandle {
        let handle = BufferHandle(self.next());
        self.buffers.insert(
            handle,
            GpuBuffer {
                usage,
                buffer: None,
            },
        );
        handle
    }

    fn upload_buffer(&mut self, buffer: BufferHandle, contents: &[u8]) {
        let Some(slot) = self.buffers.get_mut(&buffer) else {
            tracing::warn!(buffer = buffer.0, "upload to unknown buffer ignored");
            return;
        };
        if contents.is_empty() {
            slot.buffer = None;
            return;
        }
        let (label, usage) = match slot.usage {
            BufferUsage::Vertex => ("vertex_buffer", wgpu::BufferUsages::VERTEX),
            BufferUsage::Index => ("index_buffer", wgpu::BufferUsages::INDEX),
        };
        slot.buffer = Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                }),
        );
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, GpuError> {
        if source.trim().is_empty() {
            return Err(GpuError::Compile {
                stage,
                log: "empty shader source".into(),
            });
        }
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "vertex_shader",
                    ShaderStage::Fragment => "fragment_shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::Compile {
                stage,
                log: error.to_string(),
            });
        }
        let handle = ShaderHandle(self.next());
        self.shaders.insert(handle, (stage, module));
        Ok(handle)
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, GpuError> {
        let (Some((ShaderStage::Vertex, vs)), Some((ShaderStage::Fragment, fs))) =
            (self.shaders.get(&vertex), self.shaders.get(&fragment))
        else {
            return Err(GpuError::Link {
                log: "expected a vertex shader and a fragment shader".into(),
            });
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = create_pipeline(
            &self.device,
            &self.pipeline_layout,
            self.config.format,
            vs,
            fs,
        );
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::Link {
                log: error.to_string(),
            });
        }
        let handle = ProgramHandle(self.next());
        self.programs.insert(handle, pipeline);
        Ok(handle)
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        if !self.programs.contains_key(&program) {
            return None;
        }
        names::STANDARD_ATTRIBUTES
            .iter()
            .position(|n| *n == name)
            .map(|i| AttributeLocation(i as u32))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if !self.programs.contains_key(&program) {
            return None;
        }
        names::STANDARD_UNIFORMS
            .iter()
            .position(|n| *n == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.bound.program = Some(program);
    }

    fn bind_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferHandle,
        components: u32,
    ) {
        match attribute_slot(location) {
            Some((slot, expected)) if expected == components => {
                if slot == 0 {
                    self.bound.position = Some(buffer);
                } else {
                    self.bound.uv = Some(buffer);
                }
            }
            _ => tracing::debug!(
                location = location.0,
                components,
                "attribute binding not supported by pipeline layout"
            ),
        }
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        if let Some(target) = uniform_target(location) {
            self.bound.uniforms.set_mat4(target, value);
        }
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        if let Some(target) = uniform_target(location) {
            self.bound.uniforms.set_vec4(target, value);
        }
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureHandle {
        let bind_group = texture_bind_group(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            image,
        );
        let handle = TextureHandle(self.next());
        self.textures.insert(handle, bind_group);
        tracing::debug!(
            texture = handle.0,
            width = image.width,
            height = image.height,
            "texture uploaded"
        );
        handle
    }

    fn is_texture(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(&texture)
    }

    fn bind_texture(&mut self, unit: u32, sampler: UniformLocation, texture: TextureHandle) {
        // The pipeline has a single texture slot.
        if unit == 0 && uniform_target(sampler) == Some(UniformTarget::Texture) {
            self.bound.texture = Some(texture);
        }
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth = create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn clear(&mut self) {
        self.frame = PendingFrame {
            clear: true,
            ..PendingFrame::default()
        };
    }

    fn draw_indexed_triangles(&mut self, indices: BufferHandle, count: u32) {
        let (Some(program), Some(position)) = (self.bound.program, self.bound.position) else {
            tracing::debug!("draw without program or position buffer skipped");
            return;
        };
        let texture = self.bound.texture.take().filter(|t| self.textures.contains_key(t));
        let mut block = self.bound.uniforms;
        block.flags[0] = if texture.is_some() { 1.0 } else { 0.0 };
        self.frame.blocks.push(block);
        self.frame.draws.push(DrawCall {
            program,
            position,
            uv: self.bound.uv.take(),
            texture,
            indices,
            count,
        });
    }
}

fn create_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    slots: u32,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("uniform_buffer"),
        size: slots as u64 * SLOT_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("uniform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(BLOCK_SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

fn texture_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &TextureImage,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene_texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("program_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &POSITION_ATTRIBUTES,
                },
                wgpu::VertexBufferLayout {
                    array_stride: 8,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &UV_ATTRIBUTES,
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
