use crate::properties::EntityProperties;
use cubescape_render::{GpuContext, ProgramInfo};
use glam::Mat4;
use std::fmt;

/// The capabilities an entity can be composed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    Positionable,
    Rotatable,
    Meshable,
    Texturable,
    Colorable,
    Movable,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 6] = [
        Self::Positionable,
        Self::Rotatable,
        Self::Meshable,
        Self::Texturable,
        Self::Colorable,
        Self::Movable,
    ];

    /// Name used in logs and the inspector.
    pub fn name(self) -> &'static str {
        match self {
            Self::Positionable => "Positionable",
            Self::Rotatable => "Rotatable",
            Self::Meshable => "Meshable",
            Self::Texturable => "Texturable",
            Self::Colorable => "Colorable",
            Self::Movable => "Movable",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised while building an entity. Always fatal for that entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{capability} requires {requires} to be composed before it")]
    MissingDependency {
        capability: CapabilityKind,
        requires: CapabilityKind,
    },
    #[error("no capability supplied a terminal draw function")]
    MissingTerminalDraw,
    #[error("both {first} and {second} supply a terminal draw function")]
    DuplicateTerminalDraw {
        first: CapabilityKind,
        second: CapabilityKind,
    },
    #[error("invalid argument to {capability}: {reason}")]
    InvalidArgument {
        capability: CapabilityKind,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(capability: CapabilityKind, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            capability,
            reason: reason.into(),
        }
    }
}

/// What a render step draws with: the context and the active program.
pub struct Frame<'a> {
    pub gpu: &'a mut dyn GpuContext,
    pub program: &'a ProgramInfo,
}

/// Takes the accumulated transform and returns the next one.
pub type RenderStep = fn(&EntityProperties, &mut Frame<'_>, Mat4) -> Mat4;

/// Ends the render pipeline by issuing the draw call.
pub type FinishStep = fn(&EntityProperties, &mut Frame<'_>, Mat4);

/// Advances entity state by `dt` seconds.
pub type UpdateStep = fn(&mut EntityProperties, f32);

/// One composable unit of entity behavior.
///
/// The composer reads the steps first, then consumes the capability with
/// [`Capability::attach`], which merges its properties into the entity and
/// runs any one-time GPU setup.
pub trait Capability {
    fn kind(&self) -> CapabilityKind;

    /// Capabilities that must already be composed.
    fn requires(&self) -> &'static [CapabilityKind] {
        &[]
    }

    fn update_step(&self) -> Option<UpdateStep> {
        None
    }

    fn render_step(&self) -> Option<RenderStep> {
        None
    }

    fn finish_step(&self) -> Option<FinishStep> {
        None
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError>;
}
