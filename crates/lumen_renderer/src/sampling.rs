//! Random sampling helpers shared by the integrators.
//!
//! All functions draw from a caller-owned generator so every worker thread
//! keeps its own stream.

use std::f32::consts::TAU;

use lumen_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform index in `[0, len)`. `len` must be non-zero.
#[inline]
pub fn gen_index(rng: &mut dyn RngCore, len: usize) -> usize {
    rng.gen_range(0..len)
}

/// Unit vector uniformly distributed on the sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let theta = TAU * gen_f32(rng);
    let u = 2.0 * gen_f32(rng) - 1.0;
    let radius = (1.0 - u * u).max(0.0).sqrt();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(radius * cos_theta, radius * sin_theta, u)
}

/// Unit vector uniformly distributed on the hemisphere around `normal`.
///
/// Not cosine weighted.
pub fn random_hemisphere_direction(rng: &mut dyn RngCore, normal: Vec3) -> Vec3 {
    let direction = random_unit_vector(rng);
    if direction.dot(normal) < 0.0 {
        -direction
    } else {
        direction
    }
}

/// Barycentric weights of a point uniformly distributed over a triangle's
/// area, from two uniform numbers in `[0, 1)`.
pub fn uniform_triangle_barycentric(r1: f32, r2: f32) -> Vec3 {
    let sqrt_r1 = r1.sqrt();
    Vec3::new(1.0 - sqrt_r1, sqrt_r1 * (1.0 - r2), sqrt_r1 * r2)
}

/// SplitMix64 finalizer, used to derive independent per-pixel seeds.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for the random stream of one pixel of a seeded render.
#[inline]
pub fn pixel_seed(seed: u64, pixel_index: usize) -> u64 {
    splitmix64(seed ^ splitmix64(pixel_index as u64))
}
