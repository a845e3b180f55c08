use crate::context::{
    AttributeLocation, BufferHandle, GpuContext, GpuError, ProgramHandle, ShaderStage,
    TextureHandle, UniformLocation,
};
use glam::{Mat4, Vec4};
use std::collections::BTreeMap;

/// Attribute and uniform names every built-in program exposes.
pub mod names {
    pub const VERTEX_POSITION: &str = "vertexPosition";
    pub const TEXTURE_COORDINATE: &str = "textureCoordinate";

    pub const PERSPECTIVE_MATRIX: &str = "perspectiveMatrix";
    pub const CAMERA_ROTATION_MATRIX: &str = "cameraRotationMatrix";
    pub const MODEL_VIEW_MATRIX: &str = "modelViewMatrix";
    pub const INPUT_COLOR: &str = "inputColor";
    pub const TEXTURE1: &str = "texture1";

    pub const STANDARD_ATTRIBUTES: &[&str] = &[VERTEX_POSITION, TEXTURE_COORDINATE];
    pub const STANDARD_UNIFORMS: &[&str] = &[
        PERSPECTIVE_MATRIX,
        CAMERA_ROTATION_MATRIX,
        MODEL_VIEW_MATRIX,
        INPUT_COLOR,
        TEXTURE1,
    ];
}

/// Shader sources for one named program plus the interface to resolve after
/// linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub vertex: String,
    pub fragment: String,
    pub attributes: Vec<String>,
    pub uniforms: Vec<String>,
}

impl ProgramSource {
    /// A program exposing the standard attribute and uniform set.
    pub fn standard(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            attributes: names::STANDARD_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            uniforms: names::STANDARD_UNIFORMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A linked program with its resolved attribute/uniform locations.
///
/// Names the program does not expose resolve to nothing, and the setters
/// below ignore them, the same way a GL location of -1 is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    handle: ProgramHandle,
    attributes: BTreeMap<String, AttributeLocation>,
    uniforms: BTreeMap<String, UniformLocation>,
}

impl ProgramInfo {
    /// Linked program handle.
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Resolved location of attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<AttributeLocation> {
        self.attributes.get(name).copied()
    }

    /// Resolved location of uniform `name`.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeLocation> {
        &self.attributes
    }

    pub fn uniforms(&self) -> &BTreeMap<String, UniformLocation> {
        &self.uniforms
    }

    /// Set a matrix uniform by name. Unresolved names are skipped.
    pub fn set_mat4(&self, gpu: &mut dyn GpuContext, name: &str, value: &Mat4) {
        if let Some(location) = self.uniform(name) {
            gpu.set_uniform_mat4(location, value);
        }
    }

    /// Set a vector uniform by name. Unresolved names are skipped.
    pub fn set_vec4(&self, gpu: &mut dyn GpuContext, name: &str, value: Vec4) {
        if let Some(location) = self.uniform(name) {
            gpu.set_uniform_vec4(location, value);
        }
    }

    /// Bind `buffer` to attribute `name`. Unresolved names are skipped.
    pub fn bind_attribute(
        &self,
        gpu: &mut dyn GpuContext,
        name: &str,
        buffer: BufferHandle,
        components: u32,
    ) {
        if let Some(location) = self.attribute(name) {
            gpu.bind_attribute(location, buffer, components);
        }
    }

    /// Bind `texture` on `unit` to sampler `name`. Unresolved names are skipped.
    pub fn bind_texture(
        &self,
        gpu: &mut dyn GpuContext,
        name: &str,
        unit: u32,
        texture: TextureHandle,
    ) {
        if let Some(location) = self.uniform(name) {
            gpu.bind_texture(unit, location, texture);
        }
    }
}

/// Why a program could not be built. Cached and handed back on every lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("no shader sources registered for program `{0}`")]
    UnknownProgram(String),
    #[error("program `{program}` has no {stage} shader source")]
    MissingSource { program: String, stage: ShaderStage },
    #[error("program `{program}`: unable to compile {stage} shader: {log}")]
    Compile {
        program: String,
        stage: ShaderStage,
        log: String,
    },
    #[error("program `{program}`: unable to link: {log}")]
    Link { program: String, log: String },
}

/// Memoising store of linked programs keyed by name.
///
/// Each name is built at most once. A failed build is cached too, so a broken
/// shader costs one compile and every later lookup gets the same error back.
#[derive(Debug, Default)]
pub struct ProgramCache {
    sources: BTreeMap<String, ProgramSource>,
    cache: BTreeMap<String, Result<ProgramInfo, ProgramError>>,
    compile_attempts: usize,
}

impl ProgramCache {
    /// Cache with no programs registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register sources under `name`. An entry already built for `name` is
    /// kept as is.
    pub fn register(&mut self, name: impl Into<String>, source: ProgramSource) {
        let name = name.into();
        if self.cache.contains_key(&name) {
            tracing::debug!(program = %name, "sources replaced after build; cached entry kept");
        }
        self.sources.insert(name, source);
    }

    /// Builder form of [`ProgramCache::register`].
    pub fn with_program(mut self, name: impl Into<String>, source: ProgramSource) -> Self {
        self.register(name, source);
        self
    }

    /// Look up a program, building and caching it on first use.
    pub fn get_program(
        &mut self,
        gpu: &mut dyn GpuContext,
        name: &str,
    ) -> Result<&ProgramInfo, ProgramError> {
        if !self.cache.contains_key(name) {
            let built = self.build(gpu, name);
            match &built {
                Ok(info) => {
                    tracing::debug!(program = name, handle = info.handle.0, "program linked")
                }
                Err(e) => tracing::warn!(program = name, "program build failed: {e}"),
            }
            self.cache.insert(name.to_string(), built);
        }

        match self.cache.get(name) {
            Some(Ok(info)) => Ok(info),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ProgramError::UnknownProgram(name.to_string())),
        }
    }

    /// Whether `name` has been built, successfully or not.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Number of builds attempted so far (one per distinct name at most).
    pub fn compile_attempts(&self) -> usize {
        self.compile_attempts
    }

    /// Registered program names, sorted.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    fn build(&mut self, gpu: &mut dyn GpuContext, name: &str) -> Result<ProgramInfo, ProgramError> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| ProgramError::UnknownProgram(name.to_string()))?;
        self.compile_attempts += 1;

        for (stage, text) in [
            (ShaderStage::Vertex, &source.vertex),
            (ShaderStage::Fragment, &source.fragment),
        ] {
            if text.trim().is_empty() {
                return Err(ProgramError::MissingSource {
                    program: name.to_string(),
                    stage,
                });
            }
        }

        let compile_error = |e: GpuError| match e {
            GpuError::Compile { stage, log } => ProgramError::Compile {
                program: name.to_string(),
                stage,
                log,
            },
            GpuError::Link { log } => ProgramError::Link {
                program: name.to_string(),
                log,
            },
        };

        let vertex = gpu
            .compile_shader(ShaderStage::Vertex, &source.vertex)
            .map_err(compile_error)?;
        let fragment = gpu
            .compile_shader(ShaderStage::Fragment, &source.fragment)
            .map_err(compile_error)?;
        let handle = gpu.link_program(vertex, fragment).map_err(compile_error)?;

        let attributes = source
            .attributes
            .iter()
            .filter_map(|n| Some((n.clone(), gpu.attribute_location(handle, n)?)))
            .collect();
        let uniforms = source
            .uniforms
            .iter()
            .filter_map(|n| Some((n.clone(), gpu.uniform_location(handle, n)?)))
            .collect();

        Ok(ProgramInfo {
            handle,
            attributes,
            uniforms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{GpuCall, HeadlessContext};

    fn source(vertex: &str, fragment: &str) -> ProgramSource {
        ProgramSource::standard(vertex, fragment)
    }

    #[test]
    fn builds_and_resolves_locations() {
        let mut gpu = HeadlessContext::new(640, 480);
        let mut cache = ProgramCache::new().with_program("simple", source("vs", "fs"));

        let info = cache.get_program(&mut gpu, "simple").unwrap();
        assert!(info.attribute(names::VERTEX_POSITION).is_some());
        assert!(info.uniform(names::MODEL_VIEW_MATRIX).is_some());
        assert!(info.uniform("notDeclared").is_none());
        assert!(cache.is_cached("simple"));
    }

    #[test]
    fn success_is_memoised() {
        let mut gpu = HeadlessContext::new(640, 480);
        let mut cache = ProgramCache::new().with_program("simple", source("vs", "fs"));

        let first = cache.get_program(&mut gpu, "simple").unwrap().handle();
        let second = cache.get_program(&mut gpu, "simple").unwrap().handle();
        assert_eq!(first, second);
        assert_eq!(cache.compile_attempts(), 1);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::CompileShader { .. })), 2);
    }

    #[test]
    fn failure_is_cached_and_identical() {
        let mut gpu = HeadlessContext::new(640, 480);
        let mut cache =
            ProgramCache::new().with_program("x", source("vs", "#error missing semicolon"));

        let first = cache.get_program(&mut gpu, "x").unwrap_err();
        let second = cache.get_program(&mut gpu, "x").unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(
            first,
            ProgramError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(cache.compile_attempts(), 1);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::CompileShader { .. })), 2);
    }

    #[test]
    fn unknown_program_is_an_error_value() {
        let mut gpu = HeadlessContext::new(640, 480);
        let mut cache = ProgramCache::new();
        let err = cache.get_program(&mut gpu, "nope").unwrap_err();
        assert_eq!(err, ProgramError::UnknownProgram("nope".into()));
        assert_eq!(cache.compile_attempts(), 0);
    }

    #[test]
    fn empty_source_never_reaches_the_compiler() {
        let mut gpu = HeadlessContext::new(640, 480);
        let mut cache = ProgramCache::new().with_program("blank", source("vs", "   "));
        let err = cache.get_program(&mut gpu, "blank").unwrap_err();
        assert!(matches!(
            err,
            ProgramError::MissingSource {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::CompileShader { .. })), 0);
    }

    #[test]
    fn link_failure_is_reported() {
        let mut gpu = HeadlessContext::new(640, 480);
        gpu.fail_next_link("varying mismatch");
        let mut cache = ProgramCache::new().with_program("simple", source("vs", "fs"));
        let err = cache.get_program(&mut gpu, "simple").unwrap_err();
        assert_eq!(
            err,
            ProgramError::Link {
                program: "simple".into(),
                log: "varying mismatch".into()
            }
        );
    }

    #[test]
    fn setters_ignore_unknown_names() {
        let mut gpu = HeadlessContext::new(640, 480);
        let mut cache = ProgramCache::new().with_program("simple", source("vs", "fs"));
        let info = cache.get_program(&mut gpu, "simple").unwrap().clone();
        let before = gpu.calls().len();
        info.set_vec4(&mut gpu, "unknown", Vec4::ONE);
        assert_eq!(gpu.calls().len(), before);
        info.set_vec4(&mut gpu, names::INPUT_COLOR, Vec4::ONE);
        assert_eq!(gpu.calls().len(), before + 1);
    }
}
