use nalgebra as na;
use na::{vector, Matrix4, Vector3, Vector4};

/// Determinants smaller than this are treated as singular.
const SINGULARITY_EPSILON: f32 = 1e-9;

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a vector to homogenous coordinates.
pub fn to_hom_vector(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Transformation of a point from homogenous coordinates, applying the
/// perspective divide.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Transformation of a vector from homogenous coordinates.
pub fn from_hom_vector(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x, v.y, v.z];
}

/// Inverse followed by transpose, the transform that keeps normals
/// perpendicular to surfaces under non-uniform scaling. A plain inverse or a
/// plain transpose is not a substitute.
///
/// Returns None when the matrix is singular or close to it.
pub fn invert_transpose(m: &Matrix4<f32>) -> Option<Matrix4<f32>> {
    if m.determinant().abs() < SINGULARITY_EPSILON {
        return None;
    }
    return m.try_inverse().map(|inverse| inverse.transpose());
}

/// Unit vector in the direction of v, except that the zero vector is
/// returned unchanged instead of producing NaN components.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    return v.try_normalize(SINGULARITY_EPSILON).unwrap_or(v);
}
