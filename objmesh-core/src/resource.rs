//! Renderer-side buffers tied to a mesh.
//!
//! A [`GpuMesh`] holds at most one live buffer handle for its mesh. The
//! handle is released before a replacement is uploaded, on `clear`, and when
//! the `GpuMesh` is dropped, so every `upload` is paired with exactly one
//! `release`.

use std::io::BufRead;
use std::path::Path;

use log::debug;

use crate::error::MeshResult;
use crate::geometry::Vertex;
use crate::mesh::Mesh;

/// The renderer's side of vertex buffer management
pub trait VertexUploader {
    type Handle;

    /// Upload an assembled vertex buffer, three vertices per triangle
    fn upload(&mut self, vertices: &[Vertex]) -> Self::Handle;

    /// Free a buffer returned by `upload`
    fn release(&mut self, handle: Self::Handle);
}

/// A mesh together with its uploaded vertex buffer
pub struct GpuMesh<U: VertexUploader> {
    mesh: Mesh,
    uploader: U,
    handle: Option<U::Handle>,
}

impl<U: VertexUploader> GpuMesh<U> {
    /// An empty mesh; nothing is uploaded until the first successful load
    pub fn new(uploader: U) -> Self {
        Self {
            mesh: Mesh::new(),
            uploader,
            handle: None,
        }
    }

    /// Load an OBJ file and upload it.
    ///
    /// On error the mesh and its live buffer are left as they were.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> MeshResult<()> {
        self.mesh.load(path)?;
        self.reupload();
        Ok(())
    }

    pub fn load_from_reader<R: BufRead>(&mut self, reader: R, source_name: &str) -> MeshResult<()> {
        self.mesh.load_from_reader(reader, source_name)?;
        self.reupload();
        Ok(())
    }

    pub fn load_from_str(&mut self, input: &str) -> MeshResult<()> {
        self.mesh.load_from_str(input)?;
        self.reupload();
        Ok(())
    }

    pub fn move_to(&mut self, x: f32, y: f32, z: f32) {
        self.mesh.move_to(x, y, z);
        self.reupload();
    }

    pub fn rotate_to(&mut self, roll: f32, pitch: f32, yaw: f32) {
        self.mesh.rotate_to(roll, pitch, yaw);
        self.reupload();
    }

    pub fn rotate_by(&mut self, d_roll: f32, d_pitch: f32, d_yaw: f32) {
        self.mesh.rotate_by(d_roll, d_pitch, d_yaw);
        self.reupload();
    }

    /// Release the buffer and drop all geometry
    pub fn clear(&mut self) {
        self.release();
        self.mesh.clear();
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn handle(&self) -> Option<&U::Handle> {
        self.handle.as_ref()
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    fn reupload(&mut self) {
        self.release();
        debug!("Uploading {} vertices", self.mesh.vertex_count());
        self.handle = Some(self.uploader.upload(self.mesh.vertices()));
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.uploader.release(handle);
        }
    }
}

impl<U: VertexUploader> Drop for GpuMesh<U> {
    fn drop(&mut self) {
        self.release();
    }
}
