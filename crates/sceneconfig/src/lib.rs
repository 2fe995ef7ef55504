use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

mod presets;

pub use presets::{builtin, BUILTIN_SCENES};

/// Base angular step of every spin curve: twice the earth's axial tilt, in radians.
pub const AXIAL_TILT_STEP: f64 = 23.44 * std::f64::consts::PI / 90.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneFile {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub scenes: BTreeMap<String, Scene>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_interval: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub asset: AssetSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSpec>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_interval: Option<Duration>,
    #[serde(default)]
    pub camera: CameraSpec,
    #[serde(default)]
    pub clocks: BTreeMap<String, ClockSpec>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialSpec>,
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectSpec>,
    #[serde(default)]
    pub lights: Vec<LightSpec>,
    #[serde(default)]
    pub uniforms: Vec<UniformBindingSpec>,
    #[serde(default)]
    pub transforms: Vec<TransformBindingSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_pulse: Option<GeometryPulseSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Font,
    Model,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetSpec {
    pub kind: AssetKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextSpec {
    pub content: String,
    #[serde(default = "default_text_size")]
    pub size: f32,
    #[serde(default = "default_text_height")]
    pub height: f32,
    #[serde(default = "default_curve_segments")]
    pub curve_segments: u32,
    #[serde(default)]
    pub bevel: BevelSpec,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BevelSpec {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_bevel")]
    pub thickness: f32,
    #[serde(default = "default_bevel")]
    pub size: f32,
    #[serde(default = "default_bevel_segments")]
    pub segments: u32,
}

impl Default for BevelSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: default_bevel(),
            size: default_bevel(),
            segments: default_bevel_segments(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CameraSpec {
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ClockSpec {
    pub step: f64,
    #[serde(default)]
    pub start: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    /// Polar hue cycling over the mesh uv.
    Hue,
    /// Animated plasma used by the sky cube.
    Plasma,
    /// Lambert shading of a flat base colour.
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaterialSpec {
    pub program: Program,
    #[serde(default)]
    pub side: Side,
    /// Base colour for the standard program, as `0xRRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default)]
    pub uniforms: BTreeMap<String, UniformValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformKind::Float => f.write_str("float"),
            UniformKind::Vec2 => f.write_str("vec2"),
            UniformKind::Vec3 => f.write_str("vec3"),
            UniformKind::Vec4 => f.write_str("vec4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Text,
    Box,
    Model,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectSpec {
    pub shape: Shape,
    pub material: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Directional,
    Ambient,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LightSpec {
    pub kind: LightKind,
    #[serde(default = "default_light_color")]
    pub color: u32,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Wave {
    #[default]
    Sin,
    Cos,
}

impl Wave {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Wave::Sin => x.sin(),
            Wave::Cos => x.cos(),
        }
    }
}

/// Update rule attached to a uniform or transform binding.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Curve {
    /// `offset + scale * t`
    Clock {
        #[serde(default = "default_unit")]
        scale: f64,
        #[serde(default)]
        offset: f64,
    },
    /// `base + amplitude * wave(t * frequency)`
    Oscillate {
        #[serde(default)]
        base: f64,
        amplitude: f64,
        #[serde(default = "default_unit")]
        frequency: f64,
        #[serde(default)]
        wave: Wave,
    },
    /// Adds `AXIAL_TILT_STEP * scale` every tick.
    Spin { scale: f64 },
    /// Surface size, written on resize only.
    Resolution,
}

impl Curve {
    fn needs_clock(&self) -> bool {
        matches!(self, Curve::Clock { .. } | Curve::Oscillate { .. })
    }

    fn is_finite(&self) -> bool {
        match *self {
            Curve::Clock { scale, offset } => scale.is_finite() && offset.is_finite(),
            Curve::Oscillate {
                base,
                amplitude,
                frequency,
                ..
            } => base.is_finite() && amplitude.is_finite() && frequency.is_finite(),
            Curve::Spin { scale } => scale.is_finite(),
            Curve::Resolution => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniformBindingSpec {
    pub material: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
    pub curve: Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A single transform component such as `rotation.y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Property {
    pub channel: Channel,
    pub axis: Axis,
}

impl TryFrom<String> for Property {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Property {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let (channel, axis) = normalized
            .split_once('.')
            .ok_or_else(|| format!("invalid transform property '{raw}'; expected e.g. rotation.y"))?;
        let channel = match channel {
            "position" => Channel::Position,
            "rotation" => Channel::Rotation,
            "scale" => Channel::Scale,
            other => return Err(format!("unknown transform channel '{other}'")),
        };
        let axis = match axis {
            "x" => Axis::X,
            "y" => Axis::Y,
            "z" => Axis::Z,
            other => return Err(format!("unknown transform axis '{other}'")),
        };
        Ok(Self { channel, axis })
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = match self.channel {
            Channel::Position => "position",
            Channel::Rotation => "rotation",
            Channel::Scale => "scale",
        };
        let axis = match self.axis {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        write!(f, "{channel}.{axis}")
    }
}

impl From<Property> for String {
    fn from(value: Property) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformBindingSpec {
    pub object: String,
    pub property: Property,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
    pub curve: Curve,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeometryPulseSpec {
    pub object: String,
    pub clock: String,
    pub base: f32,
    pub amplitude: f32,
    #[serde(default = "default_pulse_frequency")]
    pub frequency: f32,
    #[serde(default = "default_bevel_fraction")]
    pub bevel_fraction: f32,
    /// Rebuild the extruded text every tick instead of only updating its parameters.
    #[serde(default)]
    pub regenerate: bool,
}

fn default_text_size() -> f32 {
    1.55
}

fn default_text_height() -> f32 {
    0.1
}

fn default_curve_segments() -> u32 {
    12
}

fn default_true() -> bool {
    true
}

fn default_bevel() -> f32 {
    0.05
}

fn default_bevel_segments() -> u32 {
    5
}

fn default_fov() -> f32 {
    85.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    5000.0
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 0.0, 5.0]
}

fn default_scale() -> f32 {
    1.0
}

fn default_light_color() -> u32 {
    0xffffff
}

fn default_intensity() -> f32 {
    1.0
}

fn default_unit() -> f64 {
    1.0
}

fn default_pulse_frequency() -> f32 {
    0.5
}

fn default_bevel_fraction() -> f32 {
    0.1
}

fn default_frame_interval() -> Duration {
    Duration::from_millis(16)
}

/// Splits a `0xRRGGBB` colour into linear-ish `[r, g, b]` components in `0..=1`.
pub fn rgb(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    ]
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v / 1000.0)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}ms: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => {
            serializer.serialize_str(&humantime::format_duration(*duration).to_string())
        }
        None => serializer.serialize_none(),
    }
}

impl SceneFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneFile = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn default_scene(&self) -> Option<&str> {
        self.defaults.scene.as_deref()
    }

    /// Frame interval for `name`, falling back to the file default and then 16ms.
    pub fn frame_interval(&self, name: &str) -> Duration {
        self.scenes
            .get(name)
            .and_then(|scene| scene.frame_interval)
            .or(self.defaults.frame_interval)
            .unwrap_or_else(default_frame_interval)
    }

    /// Layers `other` on top of `self`: scenes with the same name are replaced
    /// and `other`'s defaults win where set.
    pub fn merge(mut self, other: SceneFile) -> Result<Self, ConfigError> {
        for (name, scene) in other.scenes {
            self.scenes.insert(name, scene);
        }
        if other.defaults.scene.is_some() {
            self.defaults.scene = other.defaults.scene;
        }
        if other.defaults.frame_interval.is_some() {
            self.defaults.frame_interval = other.defaults.frame_interval;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.scenes.is_empty() {
            return Err(ConfigError::Invalid(
                "config must define at least one scene".into(),
            ));
        }

        if let Some(default_scene) = &self.defaults.scene {
            if !self.scenes.contains_key(default_scene) {
                return Err(ConfigError::Invalid(format!(
                    "defaults.scene references unknown scene '{default_scene}'"
                )));
            }
        }

        if let Some(interval) = self.defaults.frame_interval {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "defaults.frame_interval must be greater than zero".into(),
                ));
            }
        }

        for (name, scene) in &self.scenes {
            scene.validate(name)?;
        }

        Ok(())
    }
}

impl Scene {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid(format!("scene '{name}': {message}"));

        if let Some(interval) = self.frame_interval {
            if interval.is_zero() {
                return Err(invalid("frame_interval must be greater than zero".into()));
            }
        }

        if self.asset.path.as_os_str().is_empty() {
            return Err(invalid("asset path must not be empty".into()));
        }

        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(invalid(format!(
                "camera fov {} must be within (0, 180)",
                camera.fov
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(invalid("camera requires 0 < near < far".into()));
        }

        for (clock_name, clock) in &self.clocks {
            if !clock.step.is_finite() || clock.step <= 0.0 {
                return Err(invalid(format!(
                    "clock '{clock_name}' step must be a positive number"
                )));
            }
            if !clock.start.is_finite() {
                return Err(invalid(format!("clock '{clock_name}' start must be finite")));
            }
        }

        for (object_name, object) in &self.objects {
            if !self.materials.contains_key(&object.material) {
                return Err(invalid(format!(
                    "object '{object_name}' references unknown material '{}'",
                    object.material
                )));
            }
            match object.shape {
                Shape::Text => {
                    if self.asset.kind != AssetKind::Font {
                        return Err(invalid(format!(
                            "text object '{object_name}' requires a font asset"
                        )));
                    }
                    if self.text.is_none() {
                        return Err(invalid(format!(
                            "text object '{object_name}' requires a [text] table"
                        )));
                    }
                }
                Shape::Model => {
                    if self.asset.kind != AssetKind::Model {
                        return Err(invalid(format!(
                            "model object '{object_name}' requires a model asset"
                        )));
                    }
                }
                Shape::Box => {}
            }
            if !object.scale.is_finite() || object.scale <= 0.0 {
                return Err(invalid(format!(
                    "object '{object_name}' scale must be positive"
                )));
            }
        }

        if let Some(text) = &self.text {
            if text.content.trim().is_empty() {
                return Err(invalid("text content must not be empty".into()));
            }
            if text.size <= 0.0 {
                return Err(invalid("text size must be positive".into()));
            }
        }

        for light in &self.lights {
            if light.intensity < 0.0 {
                return Err(invalid("light intensity must be >= 0".into()));
            }
        }

        for binding in &self.uniforms {
            let label = format!("uniform '{}.{}'", binding.material, binding.name);
            let material = self.materials.get(&binding.material).ok_or_else(|| {
                invalid(format!("{label} references unknown material"))
            })?;
            let slot = material.uniforms.get(&binding.name).ok_or_else(|| {
                invalid(format!("{label} is not declared by the material"))
            })?;
            let expected = match binding.curve {
                Curve::Clock { .. } | Curve::Oscillate { .. } => UniformKind::Float,
                Curve::Resolution => UniformKind::Vec2,
                Curve::Spin { .. } => {
                    return Err(invalid(format!("{label} cannot use a spin curve")));
                }
            };
            if slot.kind() != expected {
                return Err(invalid(format!(
                    "{label} is declared as {} but its curve writes {expected}",
                    slot.kind()
                )));
            }
            self.validate_curve(&label, &binding.curve, binding.clock.as_deref())
                .map_err(invalid)?;
        }

        for binding in &self.transforms {
            let label = format!("transform '{}.{}'", binding.object, binding.property);
            if !self.objects.contains_key(&binding.object) {
                return Err(invalid(format!("{label} references unknown object")));
            }
            if matches!(binding.curve, Curve::Resolution) {
                return Err(invalid(format!("{label} cannot use a resolution curve")));
            }
            self.validate_curve(&label, &binding.curve, binding.clock.as_deref())
                .map_err(invalid)?;
        }

        if let Some(pulse) = &self.geometry_pulse {
            match self.objects.get(&pulse.object) {
                Some(object) if object.shape == Shape::Text => {}
                Some(_) => {
                    return Err(invalid(format!(
                        "geometry_pulse object '{}' must be a text object",
                        pulse.object
                    )));
                }
                None => {
                    return Err(invalid(format!(
                        "geometry_pulse references unknown object '{}'",
                        pulse.object
                    )));
                }
            }
            if !self.clocks.contains_key(&pulse.clock) {
                return Err(invalid(format!(
                    "geometry_pulse references unknown clock '{}'",
                    pulse.clock
                )));
            }
            if !(pulse.base.is_finite() && pulse.amplitude.is_finite() && pulse.frequency.is_finite())
            {
                return Err(invalid("geometry_pulse values must be finite".into()));
            }
            if !pulse.bevel_fraction.is_finite() || pulse.bevel_fraction < 0.0 {
                return Err(invalid("geometry_pulse bevel_fraction must be >= 0".into()));
            }
        }

        Ok(())
    }

    fn validate_curve(&self, label: &str, curve: &Curve, clock: Option<&str>) -> Result<(), String> {
        if !curve.is_finite() {
            return Err(format!("{label} curve parameters must be finite"));
        }
        if curve.needs_clock() {
            let clock = clock.ok_or_else(|| format!("{label} requires a clock"))?;
            if !self.clocks.contains_key(clock) {
                return Err(format!("{label} references unknown clock '{clock}'"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[defaults]
scene = "demo"
frame_interval = "20ms"

[scenes.demo]
asset = { kind = "font", path = "Roboto_Regular.json" }
text = { content = "MAD" }

[scenes.demo.clocks.shader]
step = 0.05

[scenes.demo.materials.text]
program = "hue"
uniforms = { time = 0.0, resolution = [1920.0, 1080.0] }

[scenes.demo.materials.sky]
program = "plasma"
side = "back"
uniforms = { time = 0, color1 = [1.0, 0.0, 0.95] }

[scenes.demo.objects.text]
shape = "text"
material = "text"
position = [-2.0, 0.0, 0.0]

[scenes.demo.objects.skybox]
shape = "box"
material = "sky"
scale = 5000.0

[[scenes.demo.uniforms]]
material = "text"
name = "time"
clock = "shader"
curve = { kind = "clock" }

[[scenes.demo.uniforms]]
material = "text"
name = "resolution"
curve = { kind = "resolution" }

[[scenes.demo.transforms]]
object = "skybox"
property = "rotation.y"
curve = { kind = "spin", scale = 0.01 }

[[scenes.demo.transforms]]
object = "text"
property = "position.z"
clock = "shader"
curve = { kind = "oscillate", base = 1.0, amplitude = 0.2 }
"#;

    #[test]
    fn parses_sample_config() {
        let config = SceneFile::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.default_scene(), Some("demo"));
        let scene = config.scene("demo").unwrap();
        assert_eq!(scene.clocks["shader"].step, 0.05);
        assert_eq!(
            scene.materials["sky"].uniforms["time"],
            UniformValue::Float(0.0)
        );
        assert_eq!(
            scene.materials["text"].uniforms["resolution"],
            UniformValue::Vec2([1920.0, 1080.0])
        );
        assert_eq!(
            scene.transforms[0].property,
            Property {
                channel: Channel::Rotation,
                axis: Axis::Y
            }
        );
        assert_eq!(
            scene.transforms[1].curve,
            Curve::Oscillate {
                base: 1.0,
                amplitude: 0.2,
                frequency: 1.0,
                wave: Wave::Sin
            }
        );
        assert_eq!(config.frame_interval("demo"), Duration::from_millis(20));
    }

    #[test]
    fn rejects_undeclared_uniform() {
        let broken = SAMPLE.replace("name = \"time\"", "name = \"speed\"");
        let err = SceneFile::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("not declared")));
    }

    #[test]
    fn rejects_kind_mismatch() {
        let broken = SAMPLE.replace(
            "name = \"resolution\"\ncurve = { kind = \"resolution\" }",
            "name = \"resolution\"\nclock = \"shader\"\ncurve = { kind = \"clock\" }",
        );
        let err = SceneFile::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("vec2")));
    }

    #[test]
    fn rejects_unknown_clock() {
        let broken = SAMPLE.replace("clock = \"shader\"\ncurve = { kind = \"oscillate\"", "clock = \"motion\"\ncurve = { kind = \"oscillate\"");
        let err = SceneFile::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("motion")));
    }

    #[test]
    fn rejects_non_positive_step() {
        let broken = SAMPLE.replace("step = 0.05", "step = 0.0");
        assert!(SceneFile::from_toml_str(&broken).is_err());
    }

    #[test]
    fn rejects_non_finite_interval() {
        for value in ["inf", "1e30"] {
            let broken = SAMPLE.replace(
                "frame_interval = \"20ms\"",
                &format!("frame_interval = {value}"),
            );
            let err = SceneFile::from_toml_str(&broken).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{value}: {err}");
        }
        let fractional = SAMPLE.replace("frame_interval = \"20ms\"", "frame_interval = 12.5");
        let config = SceneFile::from_toml_str(&fractional).unwrap();
        assert_eq!(config.defaults.frame_interval, Some(Duration::from_micros(12_500)));
    }

    #[test]
    fn rejects_bad_property() {
        let broken = SAMPLE.replace("rotation.y", "rotation.w");
        let err = SceneFile::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unknown_default_scene() {
        let broken = SAMPLE.replace("scene = \"demo\"", "scene = \"missing\"");
        assert!(SceneFile::from_toml_str(&broken).is_err());
    }

    #[test]
    fn merge_replaces_scenes_and_defaults() {
        let base = builtin().expect("builtin presets");
        let user = SceneFile::from_toml_str(SAMPLE).unwrap();
        let merged = base.merge(user).expect("merge");
        assert_eq!(merged.default_scene(), Some("demo"));
        assert!(merged.scene("mad").is_some());
        assert!(merged.scene("demo").is_some());
    }

    #[test]
    fn axial_tilt_step_matches_constant() {
        assert!((AXIAL_TILT_STEP - 0.818_210).abs() < 1e-5);
    }

    #[test]
    fn splits_hex_colour() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb(0x00ff00), [0.0, 1.0, 0.0]);
    }
}
