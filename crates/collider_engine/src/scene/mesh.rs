//! Triangle mesh geometry consumed by the collision core
//!
//! A [`Mesh`] is a shared position buffer plus an index buffer split into
//! [`Subset`]s, each a contiguous index range of whole triangles. Only
//! positions are kept; normals, texture coordinates and GPU resources belong
//! to the renderer.
//!
//! Meshes are validated once on construction, so triangle iteration never has
//! to bounds-check again.

use crate::foundation::math::Vec3;
use thiserror::Error;

/// Contiguous range of the index buffer forming whole triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subset {
    /// First index of the range
    pub start: u32,
    /// Number of indices in the range (multiple of 3)
    pub count: u32,
}

impl Subset {
    /// Create a subset covering `count` indices starting at `start`
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    fn range(self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start + self.count as usize
    }
}

/// Errors raised while assembling a mesh
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An index refers past the end of the position buffer
    #[error("index {index} at slot {slot} exceeds vertex count {vertex_count}")]
    IndexOutOfRange {
        /// Position of the offending entry in the index buffer
        slot: usize,
        /// The offending index value
        index: u32,
        /// Number of positions in the mesh
        vertex_count: usize,
    },

    /// A subset's range runs past the end of the index buffer
    #[error("subset {subset} covers indices {start}..{end} but only {index_count} exist")]
    SubsetOutOfBounds {
        /// Subset number
        subset: usize,
        /// First index of the subset
        start: usize,
        /// One past the last index of the subset
        end: usize,
        /// Length of the index buffer
        index_count: usize,
    },

    /// A subset's index count does not describe whole triangles
    #[error("subset {subset} has {count} indices, not a multiple of 3")]
    PartialTriangle {
        /// Subset number
        subset: usize,
        /// Index count of the subset
        count: u32,
    },
}

/// Indexed triangle mesh in model space
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    subsets: Vec<Subset>,
}

impl Mesh {
    /// Create a mesh, validating every subset and index
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, subsets: Vec<Subset>) -> Result<Self, MeshError> {
        for (slot, &index) in indices.iter().enumerate() {
            if index as usize >= positions.len() {
                return Err(MeshError::IndexOutOfRange {
                    slot,
                    index,
                    vertex_count: positions.len(),
                });
            }
        }

        for (number, subset) in subsets.iter().enumerate() {
            if subset.count % 3 != 0 {
                return Err(MeshError::PartialTriangle {
                    subset: number,
                    count: subset.count,
                });
            }
            let range = subset.range();
            if range.end > indices.len() {
                return Err(MeshError::SubsetOutOfBounds {
                    subset: number,
                    start: range.start,
                    end: range.end,
                    index_count: indices.len(),
                });
            }
        }

        Ok(Self { positions, indices, subsets })
    }

    /// Create a mesh with one subset spanning the whole index buffer
    pub fn single_subset(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, MeshError> {
        let count = indices.len() as u32;
        Self::new(positions, indices, vec![Subset::new(0, count)])
    }

    /// Vertex positions in model space
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Index buffer shared by all subsets
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Subset ranges
    pub fn subsets(&self) -> &[Subset] {
        &self.subsets
    }

    /// Number of triangles covered by the subsets
    pub fn triangle_count(&self) -> usize {
        self.subsets.iter().map(|s| s.count as usize / 3).sum()
    }

    /// Iterate over every subset triangle as three model-space positions
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.subsets.iter().flat_map(move |subset| {
            self.indices[subset.range()].chunks_exact(3).map(move |tri| {
                [
                    self.positions[tri[0] as usize],
                    self.positions[tri[1] as usize],
                    self.positions[tri[2] as usize],
                ]
            })
        })
    }

    /// Axis-aligned cube of side 1 centred at the origin
    ///
    /// 8 vertices, 12 triangles, counter-clockwise outward-facing winding:
    /// the top face yields floors, the bottom face ceilings, the sides walls.
    pub fn unit_cube() -> Self {
        let positions = vec![
            // Front face corners (z = +0.5)
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
            // Back face corners (z = -0.5)
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
        ];

        let indices = vec![
            // Top
            3, 2, 6, 6, 5, 3,
            // Front
            0, 1, 2, 2, 3, 0,
            // Back
            4, 5, 6, 6, 7, 4,
            // Left
            4, 0, 3, 3, 5, 4,
            // Right
            1, 7, 6, 6, 2, 1,
            // Bottom
            4, 7, 1, 1, 0, 4,
        ];

        Self {
            positions,
            indices,
            subsets: vec![Subset::new(0, 36)],
        }
    }

    /// Flat upward-facing square on the XZ plane spanning `±half_extent`
    pub fn plane(half_extent: f32) -> Self {
        let mut builder = QuadBuilder::default();
        let e = half_extent;
        builder.quad(
            Vec3::new(-e, 0.0, e),
            Vec3::new(e, 0.0, e),
            Vec3::new(e, 0.0, -e),
            Vec3::new(-e, 0.0, -e),
        );
        builder.build()
    }

    /// Staircase climbing along +Z
    ///
    /// Each step contributes a riser facing -Z (walls) and a tread facing +Y
    /// (floors), so the mesh has `4 * steps` triangles. The first riser sits
    /// at `z = 0` and the stairs are centred on `x = 0`.
    pub fn stairs(steps: u32, width: f32, step_height: f32, step_depth: f32) -> Self {
        let mut builder = QuadBuilder::default();
        let w = width * 0.5;

        for step in 0..steps {
            let y0 = step as f32 * step_height;
            let y1 = y0 + step_height;
            let z0 = step as f32 * step_depth;
            let z1 = z0 + step_depth;

            // Riser
            builder.quad(
                Vec3::new(w, y0, z0),
                Vec3::new(-w, y0, z0),
                Vec3::new(-w, y1, z0),
                Vec3::new(w, y1, z0),
            );
            // Tread
            builder.quad(
                Vec3::new(-w, y1, z1),
                Vec3::new(w, y1, z1),
                Vec3::new(w, y1, z0),
                Vec3::new(-w, y1, z0),
            );
        }

        builder.build()
    }
}

/// Accumulates quads as two triangles each, one subset per quad
#[derive(Default)]
struct QuadBuilder {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    subsets: Vec<Subset>,
}

impl QuadBuilder {
    /// Corners in winding order; the face normal is `(b - a) x (c - a)`
    fn quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let base = self.positions.len() as u32;
        let start = self.indices.len() as u32;
        self.positions.extend([a, b, c, d]);
        self.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        self.subsets.push(Subset::new(start, 6));
    }

    fn build(self) -> Mesh {
        Mesh {
            positions: self.positions,
            indices: self.indices,
            subsets: self.subsets,
        }
    }
}
