//! Text summaries of loaded meshes for the `objmesh` command.

use std::fmt;
use std::path::Path;

use nalgebra::Vector3;
use objmesh_core::{BoundingBox, Mesh, MeshResult, Pose, RotationState, Vertex};

/// What `inspect` reports about a mesh
#[derive(Debug, Clone)]
pub struct Summary {
    pub source: String,
    pub positions: usize,
    pub normals: usize,
    pub triangles: usize,
    pub has_normals: bool,
    pub bounds: BoundingBox,
    pub pose: Pose,
    /// Leading assembled vertices
    pub sample: Vec<Vertex>,
    /// Triangles whose normal is not finite
    pub degenerate: usize,
}

impl Summary {
    pub fn from_mesh(source: &str, mesh: &Mesh, show: usize) -> Self {
        let degenerate = mesh
            .triangles()
            .filter(|t| !t.vertices[0].normal.iter().all(|c| c.is_finite()))
            .count();

        Self {
            source: source.to_string(),
            positions: mesh.raw_positions().len(),
            normals: mesh.raw_normals().len(),
            triangles: mesh.triangle_count(),
            has_normals: mesh.has_normals(),
            bounds: mesh.bounding_box(),
            pose: mesh.pose(),
            sample: mesh.vertices().iter().take(show).copied().collect(),
            degenerate,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh: {}", self.source)?;
        writeln!(f, "  positions:  {}", self.positions)?;
        writeln!(f, "  normals:    {}", self.normals)?;
        writeln!(
            f,
            "  triangles:  {} ({})",
            self.triangles,
            if self.has_normals { "parsed normals" } else { "flat normals" }
        )?;
        if self.degenerate > 0 {
            writeln!(f, "  degenerate: {}", self.degenerate)?;
        }

        match (self.bounds.extent(), self.bounds.center()) {
            (Some(extent), Some(center)) => {
                writeln!(
                    f,
                    "  bounds:     min {} max {}",
                    fmt_vec(&self.bounds.min.coords),
                    fmt_vec(&self.bounds.max.coords)
                )?;
                writeln!(f, "  extent:     {}", fmt_vec(&extent))?;
                writeln!(f, "  center:     {}", fmt_vec(&center.coords))?;
            }
            _ => writeln!(f, "  bounds:     empty")?,
        }

        if !self.pose.is_identity() {
            let r = self.pose.rotation;
            writeln!(
                f,
                "  pose:       offset {} rotation ({:.4}, {:.4}, {:.4})",
                fmt_vec(&self.pose.offset),
                r.roll,
                r.pitch,
                r.yaw
            )?;
        }

        for (i, vertex) in self.sample.iter().enumerate() {
            writeln!(
                f,
                "  [{:>3}] p {}  n {}",
                i,
                fmt_vec(&vertex.position.coords),
                fmt_vec(&vertex.normal)
            )?;
        }

        Ok(())
    }
}

fn fmt_vec(v: &Vector3<f32>) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

/// Load `path`, apply the optional offset and rotation, and summarize it
pub fn inspect(
    path: &Path,
    offset: Option<[f32; 3]>,
    rotation: Option<[f32; 3]>,
    show: usize,
) -> MeshResult<Summary> {
    let mut mesh = Mesh::from_path(path)?;

    if offset.is_some() || rotation.is_some() {
        let offset = offset.unwrap_or_default();
        let rotation = rotation.unwrap_or_default();
        mesh.set_pose(Pose::new(
            Vector3::from(offset),
            RotationState::new(rotation[0], rotation[1], rotation[2]),
        ));
    }

    Ok(Summary::from_mesh(&path.display().to_string(), &mesh, show))
}
