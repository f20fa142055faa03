//! Rigid transforms: rotation state, pose, and rotation matrices
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};

/// Rotation around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    /// About X
    pub roll: f32,
    /// About Y
    pub pitch: f32,
    /// About Z
    pub yaw: f32,
}

impl RotationState {
    pub fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }

    pub fn zero() -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_roll: f32, d_pitch: f32, d_yaw: f32) {
        self.roll += d_roll;
        self.pitch += d_pitch;
        self.yaw += d_yaw;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for rigid transformations
pub struct Transform;

impl Transform {
    /// Rotation matrix `Rx(roll) * Ry(pitch) * Rz(yaw)`, right-handed
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix3<f32> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation.roll);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation.pitch);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), rotation.yaw);

        (rx * ry * rz).into_inner()
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }
}

/// Placement of a mesh: rotated about its own origin, then translated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub offset: Vector3<f32>,
    pub rotation: RotationState,
}

impl Pose {
    pub fn new(offset: Vector3<f32>, rotation: RotationState) -> Self {
        Self { offset, rotation }
    }

    pub fn identity() -> Self {
        Self {
            offset: Vector3::zeros(),
            rotation: RotationState::zero(),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// `R * point + offset`
    pub fn apply(&self, point: &Point3<f32>) -> Point3<f32> {
        Transform::rotation_matrix(&self.rotation) * point + self.offset
    }

    /// Apply the pose to every point, building the rotation once
    pub fn apply_all(&self, points: &[Point3<f32>]) -> Vec<Point3<f32>> {
        let rotation = Transform::rotation_matrix(&self.rotation);
        points.iter().map(|p| rotation * p + self.offset).collect()
    }

    /// The same transform as a homogeneous model matrix
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(&self.offset)
            * Transform::rotation_matrix(&self.rotation).to_homogeneous()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
