use driver::{Camera, Geometry, Scene, SceneObject, Side, Transform};
use glam::{Mat4, Vec2, Vec3};
use image::{Rgb, RgbImage};

use crate::programs::{shade, to_rgb8, Fragment};

/// Colour behind everything when no back-faced cube encloses the camera.
const CLEAR_COLOR: Vec3 = Vec3::ZERO;

#[derive(Debug, Clone, Copy)]
struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    t: f32,
    fragment: Fragment,
}

/// Ray-casts `scene` from `camera` into `target`, one sample per pixel.
pub fn rasterize(scene: &Scene, camera: &Camera, target: &mut RgbImage) {
    let (width, height) = target.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let inverse = camera.view_projection().inverse();
    let locals: Vec<(&SceneObject, Mat4)> = scene
        .objects()
        .iter()
        .map(|object| (object, object.transform.matrix().inverse()))
        .collect();

    for (x, y, pixel) in target.enumerate_pixels_mut() {
        let ndc = Vec2::new(
            (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
        );
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let ray = Ray {
            origin: camera.position,
            direction: (far - near).normalize_or_zero(),
        };

        let mut best: Option<(Hit, &SceneObject)> = None;
        for &(object, to_local) in &locals {
            let side = scene.material_by_id(object.material).side;
            let Some(hit) = intersect(object, side, &to_local, camera.near, ray) else {
                continue;
            };
            if best.map_or(true, |(current, _)| hit.t < current.t) {
                best = Some((hit, object));
            }
        }

        let color = match best {
            Some((hit, object)) => {
                let material = scene.material_by_id(object.material);
                shade(material, scene.lights(), hit.fragment)
            }
            None => CLEAR_COLOR,
        };
        *pixel = Rgb(to_rgb8(color));
    }
}

fn intersect(object: &SceneObject, side: Side, to_local: &Mat4, near: f32, ray: Ray) -> Option<Hit> {
    let local = Ray {
        origin: to_local.transform_point3(ray.origin),
        direction: to_local.transform_vector3(ray.direction),
    };
    let (t, local_normal, uv) = match &object.geometry {
        Geometry::Text(text) => {
            let (width, height) = text.extent();
            front_plane(local, width, height, text.built().height)?
        }
        Geometry::Cube { size } => cube(local, *size, side)?,
        Geometry::Model(model) => sphere(local, model.radius)?,
    };
    if t < near {
        return None;
    }
    Some(Hit {
        t,
        fragment: Fragment {
            uv,
            normal: world_normal(&object.transform, local_normal),
        },
    })
}

fn world_normal(transform: &Transform, local: Vec3) -> Vec3 {
    let normal_matrix = transform.matrix().inverse().transpose();
    normal_matrix.transform_vector3(local).normalize_or_zero()
}

/// Front face of extruded text: the rectangle `[0, width] × [0, height]` at `z = depth`.
fn front_plane(ray: Ray, width: f32, height: f32, depth: f32) -> Option<(f32, Vec3, Vec2)> {
    if ray.direction.z.abs() < f32::EPSILON || width <= 0.0 || height <= 0.0 {
        return None;
    }
    let t = (depth - ray.origin.z) / ray.direction.z;
    let point = ray.at(t);
    let inside = (0.0..=width).contains(&point.x) && (0.0..=height).contains(&point.y);
    inside.then(|| (t, Vec3::Z, Vec2::new(point.x / width, point.y / height)))
}

/// Centred cube of edge `size`. Back-sided cubes are hit on their exit face,
/// front-sided ones only on an entry face in front of the ray.
fn cube(ray: Ray, size: f32, side: Side) -> Option<(f32, Vec3, Vec2)> {
    let half = size * 0.5;
    let inverse = ray.direction.recip();
    let t0 = (Vec3::splat(-half) - ray.origin) * inverse;
    let t1 = (Vec3::splat(half) - ray.origin) * inverse;
    let t_enter = t0.min(t1).max_element();
    let t_exit = t0.max(t1).min_element();
    if t_exit < t_enter.max(0.0) {
        return None;
    }
    let back_face = match side {
        Side::Back => true,
        Side::Front if t_enter <= 0.0 => return None,
        Side::Front => false,
        Side::Double => t_enter <= 0.0,
    };
    let t = if back_face { t_exit } else { t_enter };
    let point = ray.at(t) / size;
    let axis = point.abs();
    let (normal, uv) = if axis.x >= axis.y && axis.x >= axis.z {
        (
            Vec3::X * point.x.signum(),
            Vec2::new(point.z * -point.x.signum(), point.y),
        )
    } else if axis.y >= axis.z {
        (
            Vec3::Y * point.y.signum(),
            Vec2::new(point.x, point.z * -point.y.signum()),
        )
    } else {
        (
            Vec3::Z * point.z.signum(),
            Vec2::new(point.x * point.z.signum(), point.y),
        )
    };
    let normal = if back_face { -normal } else { normal };
    Some((t, normal, uv + Vec2::splat(0.5)))
}

fn sphere(ray: Ray, radius: f32) -> Option<(f32, Vec3, Vec2)> {
    let a = ray.direction.length_squared();
    let b = ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 || a == 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    let normal = (ray.at(t) / radius).normalize_or_zero();
    let uv = Vec2::new(
        0.5 + normal.z.atan2(normal.x) / std::f32::consts::TAU,
        0.5 + normal.y.asin() / std::f32::consts::PI,
    );
    Some((t, normal, uv))
}
