//! Reflection and refraction of ray directions at a surface.

use glam::Vec3;

/// Mirror `incident` about the surface normal `n`.
#[inline]
pub fn reflect(incident: Vec3, n: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(n) * n
}

/// Refract `incident` through a surface with normal `n` and index ratio `eta`.
///
/// Returns the zero vector on total internal reflection.
#[inline]
pub fn refract(incident: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let n_dot_i = n.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - n_dot_i * n_dot_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * incident - (eta * n_dot_i + k.sqrt()) * n
    }
}

/// Bend `incident` through a surface of refraction index `ior`.
///
/// Works from either side: a ray leaving the medium (same side as `n`) uses
/// the flipped normal and `ior`, a ray entering uses `1 / ior`. Rays past the
/// critical angle are mirror reflected.
pub fn refract_through(incident: Vec3, n: Vec3, ior: f32) -> Vec3 {
    let (n, eta) = if n.dot(incident) > 0.0 {
        (-n, ior)
    } else {
        (n, 1.0 / ior)
    };

    let sin_out = n.dot(incident).clamp(-1.0, 1.0).acos().sin() * eta;
    if -1.0 < sin_out && sin_out < 1.0 {
        refract(incident, n, eta)
    } else {
        reflect(incident, n)
    }
}
