use bytemuck::{Pod, Zeroable};
use cubescape_render::{AttributeLocation, UniformLocation, names};
use glam::{Mat4, Vec4};

/// Distance between per-draw uniform blocks in the uniform buffer. Matches
/// the default `min_uniform_buffer_offset_alignment`.
pub const SLOT_STRIDE: u64 = 256;

/// Uniform values for one draw, laid out as the `Uniforms` struct in WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub perspective: [[f32; 4]; 4],
    pub camera_rotation: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub input_color: [f32; 4],
    /// `x` is 1.0 when the draw samples a texture.
    pub flags: [f32; 4],
}

impl Default for UniformBlock {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            perspective: identity,
            camera_rotation: identity,
            model_view: identity,
            input_color: Vec4::ONE.to_array(),
            flags: [0.0; 4],
        }
    }
}

pub const BLOCK_SIZE: u64 = std::mem::size_of::<UniformBlock>() as u64;

/// Which field of the block a uniform location writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformTarget {
    Perspective,
    CameraRotation,
    ModelView,
    InputColor,
    Texture,
}

/// Locations are indices into the standard uniform list.
pub fn uniform_target(location: UniformLocation) -> Option<UniformTarget> {
    let name = names::STANDARD_UNIFORMS.get(location.0 as usize)?;
    Some(match *name {
        names::PERSPECTIVE_MATRIX => UniformTarget::Perspective,
        names::CAMERA_ROTATION_MATRIX => UniformTarget::CameraRotation,
        names::MODEL_VIEW_MATRIX => UniformTarget::ModelView,
        names::INPUT_COLOR => UniformTarget::InputColor,
        names::TEXTURE1 => UniformTarget::Texture,
        _ => return None,
    })
}

/// Vertex buffer slot fed by an attribute location, with the float count
/// the pipeline expects there.
pub fn attribute_slot(location: AttributeLocation) -> Option<(u32, u32)> {
    match names::STANDARD_ATTRIBUTES.get(location.0 as usize).copied()? {
        names::VERTEX_POSITION => Some((0, 3)),
        names::TEXTURE_COORDINATE => Some((1, 2)),
        _ => None,
    }
}

impl UniformBlock {
    /// Store a matrix. False if `target` is not a matrix slot.
    pub fn set_mat4(&mut self, target: UniformTarget, value: &Mat4) -> bool {
        let cols = value.to_cols_array_2d();
        match target {
            UniformTarget::Perspective => self.perspective = cols,
            UniformTarget::CameraRotation => self.camera_rotation = cols,
            UniformTarget::ModelView => self.model_view = cols,
            UniformTarget::InputColor | UniformTarget::Texture => return false,
        }
        true
    }

    /// Store a vector. False if `target` is not a vector slot.
    pub fn set_vec4(&mut self, target: UniformTarget, value: Vec4) -> bool {
        if target != UniformTarget::InputColor {
            return false;
        }
        self.input_color = value.to_array();
        true
    }
}

/// Pack blocks at [`SLOT_STRIDE`] intervals.
pub fn pack_slots(blocks: &[UniformBlock]) -> Vec<u8> {
    let mut bytes = vec![0u8; blocks.len() * SLOT_STRIDE as usize];
    for (slot, block) in bytes.chunks_exact_mut(SLOT_STRIDE as usize).zip(blocks) {
        slot[..BLOCK_SIZE as usize].copy_from_slice(bytemuck::bytes_of(block));
    }
    bytes
}

/// Slot capacity to allocate for `needed` draws.
pub fn slot_capacity(current: u32, needed: u32) -> u32 {
    if needed <= current {
        current
    } else {
        needed.next_power_of_two().max(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_fits_one_slot() {
        assert_eq!(BLOCK_SIZE, 224);
        assert!(BLOCK_SIZE <= SLOT_STRIDE);
    }

    #[test]
    fn locations_follow_standard_order() {
        assert_eq!(
            uniform_target(UniformLocation(0)),
            Some(UniformTarget::Perspective)
        );
        assert_eq!(
            uniform_target(UniformLocation(3)),
            Some(UniformTarget::InputColor)
        );
        assert_eq!(uniform_target(UniformLocation(99)), None);
        assert_eq!(attribute_slot(AttributeLocation(1)), Some((1, 2)));
        assert_eq!(attribute_slot(AttributeLocation(7)), None);
    }

    #[test]
    fn setters_reject_mismatched_kinds() {
        let mut block = UniformBlock::default();
        assert!(!block.set_vec4(UniformTarget::ModelView, Vec4::ZERO));
        assert!(!block.set_mat4(UniformTarget::InputColor, &Mat4::ZERO));
        let scale = Mat4::from_scale(glam::Vec3::splat(2.0));
        assert!(block.set_mat4(UniformTarget::ModelView, &scale));
        assert_eq!(block.model_view[0][0], 2.0);
        assert_eq!(block.input_color, [1.0; 4]);
    }

    #[test]
    fn slots_are_aligned() {
        let mut second = UniformBlock::default();
        second.flags[0] = 1.0;
        let bytes = pack_slots(&[UniformBlock::default(), second]);
        assert_eq!(bytes.len(), 512);
        let flags_offset = 256 + 208;
        let flag = f32::from_le_bytes(bytes[flags_offset..flags_offset + 4].try_into().unwrap());
        assert_eq!(flag, 1.0);
    }

    #[test]
    fn capacity_grows_in_powers_of_two() {
        assert_eq!(slot_capacity(0, 3), 16);
        assert_eq!(slot_capacity(16, 16), 16);
        assert_eq!(slot_capacity(16, 17), 32);
    }
}
