//! Procedural colour fields, evaluated per pixel on the CPU.
//!
//! Each program is a pure function of a surface coordinate and the material's
//! uniform values; nothing here keeps state between frames.

use driver::{Light, Material, Program, UniformStore};
use glam::{Vec2, Vec3};

/// Inputs of one shaded sample.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Surface coordinate in `[0, 1]²`.
    pub uv: Vec2,
    /// World-space unit normal of the surface at the sample.
    pub normal: Vec3,
}

/// Shades `fragment` with the program of `material`.
pub fn shade(material: &Material, lights: &[Light], fragment: Fragment) -> Vec3 {
    let time = uniform_time(&material.uniforms);
    match material.program {
        Program::Hue => hue_field(fragment.uv, time),
        Program::Plasma => plasma(fragment.uv, time),
        Program::Standard => lambert(Vec3::from(material.color), fragment.normal, lights),
    }
}

fn uniform_time(uniforms: &UniformStore) -> f32 {
    uniforms.float("time").unwrap_or(0.0)
}

/// Polar hue sweep around the centre of the surface.
pub fn hue_field(uv: Vec2, time: f32) -> Vec3 {
    let uv = Vec2::new(uv.x, 1.0 - uv.y);
    let offset = uv - Vec2::splat(0.5);
    let distance = offset.length();
    let angle = offset.y.atan2(offset.x);
    Vec3::new(
        0.5 + 0.5 * (angle + time).cos(),
        0.5 + 0.5 * (distance + time).sin(),
        0.5 + 0.5 * (distance + angle + time).cos(),
    )
}

/// GLSL `mod`: the result takes the sign of `y`.
fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// Animated plasma used on the inside of the sky cube.
pub fn plasma(uv: Vec2, time: f32) -> Vec3 {
    let p = Vec2::splat(-1.0) + 2.0 * uv;
    let a = time * 40.0;
    let g = 1.0 / 40.0;

    let mut e = 400.0 * (p.x * 0.5 + 0.5);
    let mut f = 400.0 * (p.y * 0.5 + 0.5);
    let mut i = 200.0 + (e * g + a / 150.0).sin() * 20.0;
    let mut d = 200.0 + (f * g / 2.0).cos() * 18.0 + (e * g).cos() * 7.0;
    let r = ((i - e).abs().powi(2) + (d - f).abs().powi(2)).sqrt();
    let q = f / r;
    e = r * q.cos() - a / 2.0;
    f = r * q.sin() - a / 2.0;
    d = (e * g).sin() * 176.0 + (e * g).sin() * 164.0 + r;
    let mut h = ((f + d) + a / 2.0) * g;
    i = (h + r * p.x / 1.3).cos() * (e + e + a) + (q * g * 6.0).cos() * (r + h / 3.0);
    h = (f * g).sin() * 144.0 - (e * g).sin() * 212.0 * p.x;
    h = (h + (f - e) * q + (r - (a + h) / 7.0).sin() * 10.0 + i / 4.0) * g;
    i += (h * 2.3 * (a / 350.0 - q).sin()).cos() * 184.0 * (q - (r * 4.3 + a / 12.0) * g).sin()
        + (r * g + h).tan() * 184.0 * (r * g + h).cos();
    i = glsl_mod(i / 5.6, 256.0) / 64.0;
    if i < 0.0 {
        i += 4.0;
    }
    if i >= 2.0 {
        i = 4.0 - i;
    }
    d = r / 350.0;
    d += (d * d * 8.0).sin() * 0.52;
    f = ((a * g).sin() + 1.0) / 2.0;

    Vec3::new(f * i / 1.6, i / 2.0 + d / 13.0, i) * d * p.x
        + Vec3::new(i / 1.3 + d / 8.0, i / 2.0 + d / 18.0, i) * d * (1.0 - p.x)
}

/// Diffuse lighting. Directional lights shine from their position towards the origin.
pub fn lambert(albedo: Vec3, normal: Vec3, lights: &[Light]) -> Vec3 {
    let mut received = Vec3::ZERO;
    for light in lights {
        match *light {
            Light::Ambient { color, intensity } => received += color * intensity,
            Light::Directional {
                color,
                intensity,
                position,
            } => {
                let towards = position.normalize_or_zero();
                received += color * intensity * normal.dot(towards).max(0.0);
            }
        }
    }
    albedo * received
}

/// Clamps a linear colour into an 8-bit RGB pixel.
pub fn to_rgb8(color: Vec3) -> [u8; 3] {
    let channel = |value: f32| {
        if value.is_nan() {
            0
        } else {
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }
    };
    [channel(color.x), channel(color.y), channel(color.z)]
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    #[test]
    fn hue_field_channels_stay_in_unit_range() {
        for step in 0..200 {
            let time = step as f32 * 0.05;
            for (x, y) in [(0.0, 0.0), (0.25, 0.75), (1.0, 1.0), (0.5, 0.1)] {
                let color = hue_field(Vec2::new(x, y), time);
                for value in color.to_array() {
                    assert!((0.0..=1.0).contains(&value), "{value}");
                }
            }
        }
    }

    #[test]
    fn hue_field_is_periodic_in_time() {
        let uv = Vec2::new(0.2, 0.7);
        let a = hue_field(uv, 0.3);
        let b = hue_field(uv, 0.3 + 2.0 * PI);
        assert!((a - b).length() < 1e-4);
    }

    #[test]
    fn hue_field_at_centre_right() {
        // uv (1, 0.5): distance 0.5, angle 0.
        let color = hue_field(Vec2::new(1.0, 0.5), 0.0);
        assert!((color.x - 1.0).abs() < 1e-6);
        assert!((color.y - (0.5 + 0.5 * 0.5_f32.sin())).abs() < 1e-6);
        assert!((color.z - (0.5 + 0.5 * 0.5_f32.cos())).abs() < 1e-6);
    }

    #[test]
    fn glsl_mod_follows_divisor_sign() {
        assert_eq!(glsl_mod(5.0, 3.0), 2.0);
        assert_eq!(glsl_mod(-1.0, 256.0), 255.0);
    }

    #[test]
    fn plasma_is_deterministic_and_moves_with_time() {
        let uv = Vec2::new(0.3, 0.6);
        assert_eq!(plasma(uv, 1.0), plasma(uv, 1.0));
        assert_ne!(plasma(uv, 0.0), plasma(uv, 1.0));
    }

    #[test]
    fn lambert_ignores_back_facing_directional_light() {
        let lights = [Light::Directional {
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::new(0.0, 0.0, 1.0),
        }];
        let lit = lambert(Vec3::ONE, Vec3::Z, &lights);
        let unlit = lambert(Vec3::ONE, Vec3::NEG_Z, &lights);
        assert_eq!(lit, Vec3::ONE);
        assert_eq!(unlit, Vec3::ZERO);
    }

    #[test]
    fn rgb8_clamps_and_zeroes_nan() {
        assert_eq!(to_rgb8(Vec3::new(2.0, -1.0, f32::NAN)), [255, 0, 0]);
        assert_eq!(to_rgb8(Vec3::splat(0.5)), [128, 128, 128]);
    }
}
