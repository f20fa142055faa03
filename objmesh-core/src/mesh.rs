//! Indexed triangle mesh loaded from a Wavefront OBJ source.
//!
//! [`Mesh`] owns the raw parsed arrays, the face index lists, and two derived
//! views: the assembled vertex buffer consumed by the renderer and the
//! bounding box. The bounding box always describes the unposed geometry.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, MeshResult};
use crate::geometry::{assemble_triangles, assemble_vertices, BoundingBox, Triangle, Vertex};
use crate::obj::{parse_obj, ObjData};
use crate::transform::{Pose, RotationState};

/// A triangle mesh with a mutable rigid pose
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    raw_positions: Vec<Point3<f32>>,
    raw_normals: Vec<Vector3<f32>>,
    v_elements: Vec<u32>,
    n_elements: Vec<u32>,
    /// `raw_positions` with the pose applied
    positions: Vec<Point3<f32>>,
    vertices: Vec<Vertex>,
    bounds: BoundingBox,
    pose: Pose,
}

impl Mesh {
    /// An empty mesh with an empty bounding box and identity pose
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mesh from an OBJ file
    pub fn from_path<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let mut mesh = Self::new();
        mesh.load(path)?;
        Ok(mesh)
    }

    /// Replace the mesh with the contents of an OBJ file.
    ///
    /// # Errors
    ///
    /// `SourceUnavailable` if the file cannot be opened or read,
    /// `MalformedGeometry` if its contents do not parse. On error the mesh
    /// keeps its previous geometry and pose.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> MeshResult<()> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| MeshError::unavailable(name.as_str(), e))?;

        self.load_from_reader(BufReader::new(file), &name)
    }

    /// Replace the mesh with OBJ text read from `reader`
    pub fn load_from_reader<R: BufRead>(&mut self, reader: R, source_name: &str) -> MeshResult<()> {
        let data = parse_obj(reader, source_name)?;
        self.commit(data);
        info!(
            "Loaded {}: {} vertices, {} triangles{}",
            source_name,
            self.raw_positions.len(),
            self.triangle_count(),
            if self.has_normals() { ", with normals" } else { "" }
        );
        Ok(())
    }

    /// Replace the mesh with OBJ text held in memory
    pub fn load_from_str(&mut self, input: &str) -> MeshResult<()> {
        self.load_from_reader(input.as_bytes(), "<memory>")
    }

    /// Swap in freshly parsed data; all prior state is dropped
    fn commit(&mut self, data: ObjData) {
        self.clear();

        self.raw_positions = data.positions;
        self.raw_normals = data.normals;
        self.v_elements = data.v_elements;
        self.n_elements = data.n_elements;
        self.bounds = data.bounds;
        self.rebuild();
    }

    /// Drop all geometry and reset the pose
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Set the translation and re-derive the vertex buffer
    pub fn move_to(&mut self, x: f32, y: f32, z: f32) {
        self.pose.offset = Vector3::new(x, y, z);
        self.rebuild();
    }

    /// Set the roll/pitch/yaw rotation (radians) and re-derive the vertex buffer
    pub fn rotate_to(&mut self, roll: f32, pitch: f32, yaw: f32) {
        self.pose.rotation = RotationState::new(roll, pitch, yaw);
        self.rebuild();
    }

    /// Add to the current roll/pitch/yaw (radians) and re-derive the vertex buffer
    pub fn rotate_by(&mut self, d_roll: f32, d_pitch: f32, d_yaw: f32) {
        self.pose.rotation.rotate(d_roll, d_pitch, d_yaw);
        self.rebuild();
    }

    /// Set the whole pose at once
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.rebuild();
    }

    /// Recompute posed positions and the assembled vertex buffer.
    ///
    /// Flat normals are re-derived from the posed positions; parsed normals
    /// are copied as-is. The bounding box is left alone.
    fn rebuild(&mut self) {
        self.positions = self.pose.apply_all(&self.raw_positions);
        self.vertices = assemble_vertices(
            &self.positions,
            &self.raw_normals,
            &self.v_elements,
            &self.n_elements,
        );
    }

    /// Posed positions and the triangle index list (copies)
    pub fn positions(&self) -> (Vec<Point3<f32>>, Vec<u32>) {
        (self.positions.clone(), self.v_elements.clone())
    }

    /// Parsed normals and their triangle index list (copies)
    pub fn normals(&self) -> (Vec<Vector3<f32>>, Vec<u32>) {
        (self.raw_normals.clone(), self.n_elements.clone())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    /// Assembled vertex buffer, three entries per triangle
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangles of the assembled buffer
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|v| Triangle::new(v[0], v[1], v[2]))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.v_elements.len() / 3
    }

    /// Whether the source supplied per-corner normals
    pub fn has_normals(&self) -> bool {
        !self.n_elements.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_positions.is_empty()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn raw_positions(&self) -> &[Point3<f32>] {
        &self.raw_positions
    }

    pub fn raw_normals(&self) -> &[Vector3<f32>] {
        &self.raw_normals
    }

    pub fn position_indices(&self) -> &[u32] {
        &self.v_elements
    }

    pub fn normal_indices(&self) -> &[u32] {
        &self.n_elements
    }

    /// Triangles built from the unposed positions, as at load time
    pub fn rest_triangles(&self) -> Vec<Triangle> {
        assemble_triangles(
            &self.raw_positions,
            &self.raw_normals,
            &self.v_elements,
            &self.n_elements,
        )
    }
}
