use anyhow::{Context, Result};
use glam::Vec3;
use sceneconfig::{rgb, Shape, UniformValue};
use tracing::{debug, info, trace, warn};

use crate::bindings::{
    compile_pulse, compile_transform, compile_uniform, GeometryPulse, TransformBinding,
    TransformRule, UniformBinding, UniformSource,
};
use crate::clock::{Clock, Clocks};
use crate::error::SetupError;
use crate::gate::Asset;
use crate::scene::{
    Camera, Geometry, Light, Material, ModelGeometry, Scene, SceneObject, TextGeometry,
    TextParameters, Transform,
};
use crate::uniforms::UniformStore;

/// Everything a host needs to draw one frame.
pub struct Frame<'a> {
    /// Zero-based index of the frame being rendered.
    pub index: u64,
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    /// Surface size in physical pixels.
    pub surface: (u32, u32),
}

/// Host-provided render function, invoked exactly once per tick.
pub trait RenderHost {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
}

impl<F> RenderHost for F
where
    F: FnMut(&Frame<'_>) -> Result<()>,
{
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        self(frame)
    }
}

/// Owns the scene, its clocks and every animated binding.
///
/// Built once after the scene's asset has loaded, then advanced with
/// [`Driver::tick`]. Resolution uniforms are only touched by
/// [`Driver::resize`].
#[derive(Debug)]
pub struct Driver {
    clocks: Clocks,
    scene: Scene,
    camera: Camera,
    uniforms: Vec<UniformBinding>,
    transforms: Vec<TransformBinding>,
    pulse: Option<GeometryPulse>,
    surface: (u32, u32),
    frames: u64,
}

impl Driver {
    /// Materialises `config` around the loaded `asset`.
    ///
    /// The initial `surface` counts as the load event for resolution uniforms.
    pub fn build(
        config: &sceneconfig::Scene,
        asset: Asset,
        surface: (u32, u32),
    ) -> Result<Self, SetupError> {
        if asset.kind() != config.asset.kind {
            return Err(SetupError::AssetMismatch {
                expected: config.asset.kind,
            });
        }

        let mut scene = Scene::default();
        for (name, spec) in &config.materials {
            let uniforms: UniformStore = spec
                .uniforms
                .iter()
                .map(|(slot, value)| (slot.clone(), *value))
                .collect();
            scene.add_material(Material {
                name: name.clone(),
                program: spec.program,
                side: spec.side,
                color: spec.color.map(rgb).unwrap_or([1.0, 1.0, 1.0]),
                uniforms,
            });
        }

        for (name, spec) in &config.objects {
            let material = scene
                .material_id(&spec.material)
                .ok_or_else(|| SetupError::UnknownMaterial(spec.material.clone()))?;
            let geometry = match (spec.shape, &asset) {
                (Shape::Text, Asset::Font(face)) => {
                    let text = config
                        .text
                        .as_ref()
                        .ok_or_else(|| SetupError::MissingText(name.clone()))?;
                    let missing = face.missing_glyphs(&text.content);
                    if !missing.is_empty() {
                        warn!(
                            object = %name,
                            family = %face.family,
                            ?missing,
                            "typeface lacks glyphs; using default advance"
                        );
                    }
                    Geometry::Text(TextGeometry::new(
                        text.content.clone(),
                        TextParameters::from(text),
                        face.measure(&text.content),
                    ))
                }
                (Shape::Model, Asset::Model(model)) => Geometry::Model(ModelGeometry {
                    radius: model.radius,
                }),
                (Shape::Box, _) => Geometry::Cube { size: 1.0 },
                (Shape::Text, _) => {
                    return Err(SetupError::AssetMismatch {
                        expected: sceneconfig::AssetKind::Font,
                    })
                }
                (Shape::Model, _) => {
                    return Err(SetupError::AssetMismatch {
                        expected: sceneconfig::AssetKind::Model,
                    })
                }
            };
            scene.add_object(SceneObject {
                name: name.clone(),
                geometry,
                material,
                transform: Transform::new(
                    Vec3::from(spec.position),
                    Vec3::from(spec.rotation),
                    Vec3::splat(spec.scale),
                ),
            });
        }

        for light in &config.lights {
            scene.add_light(Light::from(light));
        }

        let clocks = Clocks::from_specs(&config.clocks);
        let uniforms = config
            .uniforms
            .iter()
            .map(|spec| compile_uniform(spec, &scene, &clocks))
            .collect::<Result<Vec<_>, _>>()?;
        let transforms = config
            .transforms
            .iter()
            .map(|spec| compile_transform(spec, &scene, &clocks))
            .collect::<Result<Vec<_>, _>>()?;
        let pulse = config
            .geometry_pulse
            .as_ref()
            .map(|spec| compile_pulse(spec, &scene, &clocks))
            .transpose()?;

        let camera = Camera {
            position: Vec3::from(config.camera.position),
            fov: config.camera.fov,
            near: config.camera.near,
            far: config.camera.far,
            aspect: 1.0,
        };

        let mut driver = Self {
            clocks,
            scene,
            camera,
            uniforms,
            transforms,
            pulse,
            surface: (1, 1),
            frames: 0,
        };
        driver.resize(surface.0, surface.1);

        info!(
            objects = driver.scene.objects().len(),
            materials = driver.scene.materials().len(),
            clocks = driver.clocks.len(),
            uniform_bindings = driver.uniforms.len(),
            transform_bindings = driver.transforms.len(),
            geometry_pulse = driver.pulse.is_some(),
            "scene ready"
        );
        Ok(driver)
    }

    /// Advances every clock, rewrites the bound uniforms and transforms, and
    /// renders exactly one frame through `host`.
    pub fn tick<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        self.animate();
        let frame = Frame {
            index: self.frames,
            scene: &self.scene,
            camera: &self.camera,
            surface: self.surface,
        };
        host.render(&frame)
            .with_context(|| format!("render host failed on frame {}", self.frames))?;
        self.frames += 1;
        trace!(frame = self.frames, "frame rendered");
        Ok(())
    }

    fn animate(&mut self) {
        self.clocks.advance_all();

        for binding in &self.uniforms {
            let UniformSource::Clock { clock, curve } = binding.source else {
                continue;
            };
            let value = curve.sample(self.clocks.t(clock)) as f32;
            let written = self
                .scene
                .material_mut(binding.material)
                .uniforms
                .write(&binding.name, UniformValue::Float(value));
            debug_assert!(written, "uniform slot {} vanished", binding.name);
        }

        for binding in &self.transforms {
            let transform = &mut self.scene.object_mut(binding.object).transform;
            match binding.rule {
                TransformRule::Clock { clock, curve } => {
                    transform.set(binding.property, curve.sample(self.clocks.t(clock)) as f32);
                }
                TransformRule::Spin { delta } => transform.add(binding.property, delta),
            }
        }

        if let Some(pulse) = self.pulse {
            let thickness = pulse.curve.sample(self.clocks.t(pulse.clock)) as f32;
            if let Geometry::Text(text) = &mut self.scene.object_mut(pulse.object).geometry {
                text.parameters.height = thickness;
                text.parameters.bevel_thickness = thickness * pulse.bevel_fraction;
                text.parameters.bevel_size = thickness * pulse.bevel_fraction;
                if pulse.regenerate {
                    text.rebuild();
                }
            }
        }
    }

    /// Handles a surface resize: updates resolution uniforms and the camera
    /// aspect. Clocks do not move.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.surface = (width, height);
        self.camera.aspect = width as f32 / height as f32;
        let value = UniformValue::Vec2([width as f32, height as f32]);
        for binding in &self.uniforms {
            if matches!(binding.source, UniformSource::Resolution) {
                self.scene
                    .material_mut(binding.material)
                    .uniforms
                    .write(&binding.name, value);
            }
        }
        debug!(width, height, "surface resized");
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn clocks(&self) -> &Clocks {
        &self.clocks
    }

    pub fn clock(&self, name: &str) -> Option<&Clock> {
        self.clocks.get(name)
    }

    pub fn surface(&self) -> (u32, u32) {
        self.surface
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn uniform(&self, material: &str, name: &str) -> Option<UniformValue> {
        self.scene.material(material)?.uniforms.get(name)
    }

    pub fn transform(&self, object: &str) -> Option<&Transform> {
        self.scene.object(object).map(|object| &object.transform)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sceneconfig::{SceneFile, AXIAL_TILT_STEP};

    use super::*;
    use crate::gate::{AssetGate, Launch, LoadError, ModelAsset, Typeface};

    const SCENES: &str = r#"
version = 1

[scenes.mad]
asset = { kind = "font", path = "font.json" }
text = { content = "MAD", size = 1.55, height = 0.1 }

[scenes.mad.clocks.shader]
step = 0.05

[scenes.mad.materials.text]
program = "hue"
uniforms = { time = 0.0, resolution = [1.0, 1.0] }

[scenes.mad.materials.sky]
program = "plasma"
side = "back"
uniforms = { time = 0.0, offset = 33.0 }

[scenes.mad.objects.text]
shape = "text"
material = "text"
position = [-2.0, 0.0, 0.0]

[scenes.mad.objects.skybox]
shape = "box"
material = "sky"
scale = 5000.0

[[scenes.mad.uniforms]]
material = "text"
name = "time"
clock = "shader"
curve = { kind = "clock" }

[[scenes.mad.uniforms]]
material = "sky"
name = "time"
clock = "shader"
curve = { kind = "clock" }

[[scenes.mad.uniforms]]
material = "text"
name = "resolution"
curve = { kind = "resolution" }

[[scenes.mad.transforms]]
object = "text"
property = "position.z"
clock = "shader"
curve = { kind = "oscillate", base = 1.0, amplitude = 0.2 }

[[scenes.mad.transforms]]
object = "skybox"
property = "rotation.y"
curve = { kind = "spin", scale = 0.01 }

[scenes.mad.geometry_pulse]
object = "text"
clock = "shader"
base = 0.1
amplitude = 0.1
frequency = 0.5
bevel_fraction = 0.1

[scenes.relic]
asset = { kind = "model", path = "model.glb" }

[scenes.relic.materials.model]
program = "standard"
color = 0xff0000

[scenes.relic.objects.model]
shape = "model"
material = "model"
"#;

    fn scene(name: &str) -> sceneconfig::Scene {
        SceneFile::from_toml_str(SCENES)
            .expect("scene file")
            .scene(name)
            .cloned()
            .expect("scene")
    }

    fn font() -> Asset {
        let advances: HashMap<char, f32> = [('M', 863.0), ('A', 678.0), ('D', 655.0)]
            .into_iter()
            .collect();
        Asset::Font(Typeface {
            family: "Roboto".into(),
            resolution: 1000.0,
            advances,
        })
    }

    fn driver() -> Driver {
        Driver::build(&scene("mad"), font(), (1920, 1080)).expect("driver")
    }

    fn idle(_: &Frame<'_>) -> Result<()> {
        Ok(())
    }

    fn time_uniform(driver: &Driver, material: &str) -> f32 {
        match driver.uniform(material, "time") {
            Some(UniformValue::Float(value)) => value,
            other => panic!("unexpected time uniform {other:?}"),
        }
    }

    #[test]
    fn twenty_ticks_advance_shader_time_to_one() {
        let mut driver = driver();
        for _ in 0..20 {
            driver.tick(&mut idle).unwrap();
        }
        let t = driver.clock("shader").unwrap().t();
        assert!((t - 1.0).abs() < 1e-9);
        assert!((time_uniform(&driver, "text") - 1.0).abs() < 1e-6);
        assert!((time_uniform(&driver, "sky") - 1.0).abs() < 1e-6);
        assert_eq!(driver.frames_rendered(), 20);
    }

    #[test]
    fn skybox_rotation_accumulates_per_tick() {
        let mut driver = driver();
        for _ in 0..100 {
            driver.tick(&mut idle).unwrap();
        }
        let expected = (100.0 * AXIAL_TILT_STEP * 0.01) as f32;
        let rotation = driver.transform("skybox").unwrap().rotation.y;
        assert!((rotation - expected).abs() < 1e-4, "{rotation} vs {expected}");
    }

    #[test]
    fn mesh_bob_stays_within_amplitude() {
        let mut driver = driver();
        for _ in 0..500 {
            driver.tick(&mut idle).unwrap();
            let z = driver.transform("text").unwrap().position.z;
            assert!((0.8 - 1e-6..=1.2 + 1e-6).contains(&z), "z={z}");
        }
    }

    #[test]
    fn zero_ticks_keep_setup_values() {
        let driver = driver();
        assert_eq!(time_uniform(&driver, "text"), 0.0);
        assert_eq!(driver.uniform("sky", "offset"), Some(UniformValue::Float(33.0)));
        let text = driver.transform("text").unwrap();
        assert_eq!(text.position, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(driver.transform("skybox").unwrap().rotation, Vec3::ZERO);
        assert_eq!(driver.transform("skybox").unwrap().scale, Vec3::splat(5000.0));
        assert_eq!(driver.frames_rendered(), 0);
    }

    #[test]
    fn resolution_changes_only_on_resize() {
        let mut driver = driver();
        assert_eq!(
            driver.uniform("text", "resolution"),
            Some(UniformValue::Vec2([1920.0, 1080.0]))
        );
        for _ in 0..10 {
            driver.tick(&mut idle).unwrap();
        }
        assert_eq!(
            driver.uniform("text", "resolution"),
            Some(UniformValue::Vec2([1920.0, 1080.0]))
        );
        let ticks_before = driver.clock("shader").unwrap().ticks();
        driver.resize(800, 600);
        assert_eq!(
            driver.uniform("text", "resolution"),
            Some(UniformValue::Vec2([800.0, 600.0]))
        );
        assert_eq!(driver.clock("shader").unwrap().ticks(), ticks_before);
        assert!((driver.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn render_is_called_once_per_tick_with_current_state() {
        let mut driver = driver();
        let mut seen = Vec::new();
        let mut host = |frame: &Frame<'_>| -> Result<()> {
            let time = frame.scene.material("text").unwrap().uniforms.float("time");
            seen.push((frame.index, time));
            Ok(())
        };
        for _ in 0..3 {
            driver.tick(&mut host).unwrap();
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, 0);
        assert_eq!(seen[2].0, 2);
        assert!((seen[2].1.unwrap() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn pulse_updates_parameters_without_rebuilding() {
        let mut driver = driver();
        for _ in 0..10 {
            driver.tick(&mut idle).unwrap();
        }
        let Geometry::Text(text) = &driver.scene().object("text").unwrap().geometry else {
            panic!("text geometry expected");
        };
        let expected = 0.1 + 0.1 * (0.5_f64 * 0.5).sin();
        assert!((f64::from(text.parameters.height) - expected).abs() < 1e-6);
        assert!((text.parameters.bevel_size - text.parameters.height * 0.1).abs() < 1e-7);
        assert_eq!(text.built().height, 0.1);
        assert_eq!(text.rebuilds(), 0);
    }

    #[test]
    fn pulse_can_regenerate_every_tick() {
        let mut config = scene("mad");
        config.geometry_pulse.as_mut().unwrap().regenerate = true;
        let mut driver = Driver::build(&config, font(), (640, 480)).unwrap();
        for _ in 0..4 {
            driver.tick(&mut idle).unwrap();
        }
        let Geometry::Text(text) = &driver.scene().object("text").unwrap().geometry else {
            panic!("text geometry expected");
        };
        assert_eq!(text.rebuilds(), 4);
        assert_eq!(text.built(), &text.parameters);
    }

    #[test]
    fn host_failure_propagates_and_frame_is_not_counted() {
        let mut driver = driver();
        let mut failing = |_: &Frame<'_>| -> Result<()> { anyhow::bail!("gpu lost") };
        let err = driver.tick(&mut failing).unwrap_err();
        assert!(format!("{err:#}").contains("gpu lost"));
        assert_eq!(driver.frames_rendered(), 0);
    }

    #[test]
    fn rejects_asset_of_wrong_kind() {
        let model = Asset::Model(ModelAsset {
            path: "model.glb".into(),
            bytes: 10,
            radius: 1.0,
        });
        let err = Driver::build(&scene("mad"), model, (1, 1)).unwrap_err();
        assert!(matches!(err, SetupError::AssetMismatch { .. }));
    }

    #[test]
    fn rejects_binding_to_undeclared_slot() {
        let mut config = scene("mad");
        config.uniforms[0].name = "speed".into();
        let err = Driver::build(&config, font(), (1, 1)).unwrap_err();
        assert!(matches!(err, SetupError::UndeclaredUniform { .. }));
    }

    #[test]
    fn model_scene_builds_with_standard_material() {
        let model = Asset::Model(ModelAsset {
            path: "model.glb".into(),
            bytes: 2048,
            radius: 1.5,
        });
        let driver = Driver::build(&scene("relic"), model, (320, 200)).unwrap();
        let material = driver.scene().material("model").unwrap();
        assert_eq!(material.color, [1.0, 0.0, 0.0]);
        assert!(matches!(
            driver.scene().object("model").unwrap().geometry,
            Geometry::Model(ModelGeometry { radius }) if radius == 1.5
        ));
    }

    #[test]
    fn pending_or_failed_gate_never_renders() {
        let mut renders = 0u32;
        let mut host = |_: &Frame<'_>| -> Result<()> {
            renders += 1;
            Ok(())
        };

        let pending = AssetGate::pending("font.json");
        match pending.launch(&scene("mad"), (1, 1)).unwrap() {
            Launch::Pending => {}
            other => panic!("unexpected launch {other:?}"),
        }

        let mut failed = AssetGate::pending("font.json");
        failed.complete(Err(LoadError::Empty("font.json".into())));
        match failed.launch(&scene("mad"), (1, 1)).unwrap() {
            Launch::Failed(LoadError::Empty(_)) => {}
            other => panic!("unexpected launch {other:?}"),
        }

        let mut loaded = AssetGate::pending("font.json");
        loaded.complete(Ok(font()));
        let Launch::Started(mut driver) = loaded.launch(&scene("mad"), (1, 1)).unwrap() else {
            panic!("driver expected");
        };
        assert_eq!(driver.frames_rendered(), 0);
        driver.tick(&mut host).unwrap();
        drop(host);
        assert_eq!(renders, 1);
    }
}
