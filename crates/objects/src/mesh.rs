//! Unit cube geometry: four vertices per face so each face gets its own UVs.

#[rustfmt::skip]
pub const CUBE_VERTICES: [[f32; 3]; 24] = [
    // front
    [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0],
    // right
    [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0],
    // left
    [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0],
    // back
    [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0],
    // top
    [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0],
    // bottom
    [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0],
];

#[rustfmt::skip]
pub const CUBE_UVS: [[f32; 2]; 24] = [
    [0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0],
    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [0.0, 1.0],
    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [0.0, 1.0],
    [1.0, 1.0], [0.0, 1.0], [1.0, 0.0], [0.0, 0.0],
    [1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    [1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0],
];

/// Two triangles per face, `(a, b, c)` and `(b, c, d)` over the face's quad.
pub fn cube_indices() -> Vec<u16> {
    (0..6u16)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 1, base + 2, base + 3]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_every_vertex() {
        let indices = cube_indices();
        assert_eq!(indices.len(), 36);
        assert_eq!(&indices[..6], &[0, 1, 2, 1, 2, 3]);
        assert_eq!(&indices[30..], &[20, 21, 22, 21, 22, 23]);
        for v in 0..CUBE_VERTICES.len() as u16 {
            assert!(indices.contains(&v));
        }
    }

    #[test]
    fn every_face_is_axis_aligned() {
        for face in CUBE_VERTICES.chunks(4) {
            let shared = (0..3).filter(|&axis| face.iter().all(|v| v[axis] == face[0][axis]));
            assert_eq!(shared.count(), 1);
        }
    }
}
