use glam::{EulerRot, Mat4, Quat, Vec3};
use sceneconfig::{
    rgb, Axis, Channel, LightKind, LightSpec, Program, Property, Side, TextSpec,
};

use crate::uniforms::UniformStore;

/// Translation, Euler rotation (XYZ, radians) and scale of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn component(&self, property: Property) -> f32 {
        axis_of(self.channel(property.channel), property.axis)
    }

    pub fn set(&mut self, property: Property, value: f32) {
        let axis = property.axis;
        set_axis(self.channel_mut(property.channel), axis, value);
    }

    pub fn add(&mut self, property: Property, delta: f32) {
        let current = self.component(property);
        self.set(property, current + delta);
    }

    /// `T * R * S`, column-major.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }

    fn channel(&self, channel: Channel) -> Vec3 {
        match channel {
            Channel::Position => self.position,
            Channel::Rotation => self.rotation,
            Channel::Scale => self.scale,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut Vec3 {
        match channel {
            Channel::Position => &mut self.position,
            Channel::Rotation => &mut self.rotation,
            Channel::Scale => &mut self.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }
}

fn axis_of(v: Vec3, axis: Axis) -> f32 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
        Axis::Z => v.z,
    }
}

fn set_axis(v: &mut Vec3, axis: Axis, value: f32) {
    match axis {
        Axis::X => v.x = value,
        Axis::Y => v.y = value,
        Axis::Z => v.z = value,
    }
}

/// Extrusion parameters of a text mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextParameters {
    pub size: f32,
    pub height: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: u32,
}

impl From<&TextSpec> for TextParameters {
    fn from(spec: &TextSpec) -> Self {
        Self {
            size: spec.size,
            height: spec.height,
            curve_segments: spec.curve_segments,
            bevel_enabled: spec.bevel.enabled,
            bevel_thickness: spec.bevel.thickness,
            bevel_size: spec.bevel.size,
            bevel_segments: spec.bevel.segments,
        }
    }
}

/// Extruded text. `parameters` may be edited every frame; the mesh that is
/// actually drawn reflects `built`, which only changes on [`TextGeometry::rebuild`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextGeometry {
    pub content: String,
    pub parameters: TextParameters,
    built: TextParameters,
    advance_em: f32,
    rebuilds: u64,
}

impl TextGeometry {
    /// `advance_em` is the width of `content` in em units of its typeface.
    pub fn new(content: impl Into<String>, parameters: TextParameters, advance_em: f32) -> Self {
        Self {
            content: content.into(),
            parameters,
            built: parameters,
            advance_em,
            rebuilds: 0,
        }
    }

    pub fn built(&self) -> &TextParameters {
        &self.built
    }

    pub fn rebuild(&mut self) {
        self.built = self.parameters;
        self.rebuilds += 1;
    }

    /// Number of rebuilds since construction.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Width and height of the built mesh's front face in world units.
    pub fn extent(&self) -> (f32, f32) {
        (self.advance_em * self.built.size, self.built.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelGeometry {
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Text(TextGeometry),
    Cube { size: f32 },
    Model(ModelGeometry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub program: Program,
    pub side: Side,
    pub color: [f32; 3],
    pub uniforms: UniformStore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialId,
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional {
        color: Vec3,
        intensity: f32,
        position: Vec3,
    },
    Ambient {
        color: Vec3,
        intensity: f32,
    },
}

impl From<&LightSpec> for Light {
    fn from(spec: &LightSpec) -> Self {
        let color = Vec3::from(rgb(spec.color));
        match spec.kind {
            LightKind::Directional => Light::Directional {
                color,
                intensity: spec.intensity,
                position: Vec3::from(spec.position),
            },
            LightKind::Ambient => Light::Ambient {
                color,
                intensity: spec.intensity,
            },
        }
    }
}

/// Perspective camera looking down -Z from `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(1e-6),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    objects: Vec<SceneObject>,
    materials: Vec<Material>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|object| object.name == name)
            .map(ObjectId)
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|material| material.name == name)
            .map(MaterialId)
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.name == name)
    }

    pub fn object_by_id(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id.0]
    }

    pub fn material_by_id(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> &mut SceneObject {
        &mut self.objects[id.0]
    }

    pub(crate) fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(raw: &str) -> Property {
        raw.parse().unwrap()
    }

    #[test]
    fn transform_components_round_trip_through_properties() {
        let mut transform = Transform::default();
        transform.set(property("position.z"), 1.2);
        transform.add(property("rotation.y"), 0.5);
        transform.add(property("rotation.y"), 0.25);
        assert_eq!(transform.position.z, 1.2);
        assert_eq!(transform.component(property("rotation.y")), 0.75);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn text_geometry_keeps_built_mesh_until_rebuild() {
        let parameters = TextParameters {
            size: 1.55,
            height: 0.1,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.05,
            bevel_size: 0.05,
            bevel_segments: 5,
        };
        let mut text = TextGeometry::new("MAD", parameters, 2.0);
        text.parameters.height = 0.2;
        assert_eq!(text.built().height, 0.1);
        text.rebuild();
        assert_eq!(text.built().height, 0.2);
        assert_eq!(text.rebuilds(), 1);
        assert!((text.extent().0 - 3.1).abs() < 1e-6);
    }

    #[test]
    fn camera_projects_origin_to_centre() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov: 85.0,
            near: 0.1,
            far: 5000.0,
            aspect: 16.0 / 9.0,
        };
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
    }
}
