//! Geometry primitives shared by the parser and the transform step
use log::warn;
use nalgebra::{Point3, Vector3};

/// An assembled vertex with position and normal, as uploaded to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle defined by three assembled vertices
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertex positions
    pub fn calculate_normal(&self) -> Vector3<f32> {
        face_normal(
            &self.vertices[0].position,
            &self.vertices[1].position,
            &self.vertices[2].position,
        )
    }
}

/// Flat normal of the triangle `(p0, p1, p2)` in emission order.
///
/// Zero-area triangles give a NaN normal; callers tolerate it downstream.
pub fn face_normal(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Vector3<f32> {
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;

    edge1.cross(&edge2).normalize()
}

/// Axis-aligned bounding box over raw vertex positions.
///
/// The empty box has `min = +inf` and `max = -inf` on every axis, so the
/// first `include` collapses it onto that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Widen the box to contain `point`
    pub fn include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Edge lengths, or `None` for the empty box
    pub fn extent(&self) -> Option<Vector3<f32>> {
        (!self.is_empty()).then(|| self.max - self.min)
    }

    pub fn center(&self) -> Option<Point3<f32>> {
        (!self.is_empty()).then(|| nalgebra::center(&self.min, &self.max))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build one triangle per index triple in `v_elements`.
///
/// When `n_elements` is non-empty each corner copies its parsed normal;
/// otherwise every corner of a triangle gets the triangle's flat normal.
/// Indices must already be validated against `positions` and `normals`.
pub(crate) fn assemble_triangles(
    positions: &[Point3<f32>],
    normals: &[Vector3<f32>],
    v_elements: &[u32],
    n_elements: &[u32],
) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity(v_elements.len() / 3);
    let mut degenerate = 0usize;

    for (t, corners) in v_elements.chunks_exact(3).enumerate() {
        let p = [
            positions[corners[0] as usize],
            positions[corners[1] as usize],
            positions[corners[2] as usize],
        ];

        let n = if n_elements.is_empty() {
            let normal = face_normal(&p[0], &p[1], &p[2]);
            if !normal.iter().all(|c| c.is_finite()) {
                degenerate += 1;
            }
            [normal; 3]
        } else {
            let base = t * 3;
            [
                normals[n_elements[base] as usize],
                normals[n_elements[base + 1] as usize],
                normals[n_elements[base + 2] as usize],
            ]
        };

        triangles.push(Triangle::new(
            Vertex::new(p[0], n[0]),
            Vertex::new(p[1], n[1]),
            Vertex::new(p[2], n[2]),
        ));
    }

    if degenerate > 0 {
        warn!("{} degenerate triangle(s) produced non-finite normals", degenerate);
    }

    triangles
}

/// Flattened form of [`assemble_triangles`]: three vertices per triangle
pub(crate) fn assemble_vertices(
    positions: &[Point3<f32>],
    normals: &[Vector3<f32>],
    v_elements: &[u32],
    n_elements: &[u32],
) -> Vec<Vertex> {
    assemble_triangles(positions, normals, v_elements, n_elements)
        .into_iter()
        .flat_map(|triangle| triangle.vertices)
        .collect()
}
