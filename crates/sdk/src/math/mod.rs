//! Math primitives with engine-compatible layout

pub mod matrix;
pub mod vector;

pub use matrix::{Matrix, Matrix3x4, VMatrix};
pub use vector::{normalize_angle, QAngle, Vector, Vector2D, Vector3, Vector4D};
