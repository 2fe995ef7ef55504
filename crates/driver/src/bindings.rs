use sceneconfig::{Curve, GeometryPulseSpec, Property, TransformBindingSpec, UniformBindingSpec};
use sceneconfig::{UniformKind, AXIAL_TILT_STEP};

use crate::clock::{ClockId, Clocks};
use crate::curve::CurveFn;
use crate::error::SetupError;
use crate::scene::{Geometry, MaterialId, ObjectId, Scene};

#[derive(Debug, Clone, Copy)]
pub(crate) enum UniformSource {
    Clock { clock: ClockId, curve: CurveFn },
    Resolution,
}

#[derive(Debug, Clone)]
pub(crate) struct UniformBinding {
    pub material: MaterialId,
    pub name: String,
    pub source: UniformSource,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TransformRule {
    Clock { clock: ClockId, curve: CurveFn },
    /// Constant per-tick increment.
    Spin { delta: f32 },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TransformBinding {
    pub object: ObjectId,
    pub property: Property,
    pub rule: TransformRule,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct GeometryPulse {
    pub object: ObjectId,
    pub clock: ClockId,
    pub curve: CurveFn,
    pub bevel_fraction: f32,
    pub regenerate: bool,
}

fn resolve_clock(clocks: &Clocks, label: &str, clock: Option<&str>) -> Result<ClockId, SetupError> {
    let name = clock.ok_or_else(|| SetupError::MissingClock(label.to_string()))?;
    clocks
        .id(name)
        .ok_or_else(|| SetupError::UnknownClock(name.to_string()))
}

pub(crate) fn compile_uniform(
    spec: &UniformBindingSpec,
    scene: &Scene,
    clocks: &Clocks,
) -> Result<UniformBinding, SetupError> {
    let label = format!("uniform '{}.{}'", spec.material, spec.name);
    let material = scene
        .material_id(&spec.material)
        .ok_or_else(|| SetupError::UnknownMaterial(spec.material.clone()))?;
    let declared = scene
        .material_by_id(material)
        .uniforms
        .kind(&spec.name)
        .ok_or_else(|| SetupError::UndeclaredUniform {
            material: spec.material.clone(),
            name: spec.name.clone(),
        })?;

    let (source, written) = match spec.curve {
        Curve::Resolution => (UniformSource::Resolution, UniformKind::Vec2),
        Curve::Spin { .. } => return Err(SetupError::UnsupportedCurve(label)),
        ref curve => {
            let clock = resolve_clock(clocks, &label, spec.clock.as_deref())?;
            let curve = CurveFn::from_curve(curve).ok_or(SetupError::UnsupportedCurve(label))?;
            (UniformSource::Clock { clock, curve }, UniformKind::Float)
        }
    };

    if declared != written {
        return Err(SetupError::UniformKind {
            material: spec.material.clone(),
            name: spec.name.clone(),
            declared,
            written,
        });
    }

    Ok(UniformBinding {
        material,
        name: spec.name.clone(),
        source,
    })
}

pub(crate) fn compile_transform(
    spec: &TransformBindingSpec,
    scene: &Scene,
    clocks: &Clocks,
) -> Result<TransformBinding, SetupError> {
    let label = format!("transform '{}.{}'", spec.object, spec.property);
    let object = scene
        .object_id(&spec.object)
        .ok_or_else(|| SetupError::UnknownObject(spec.object.clone()))?;
    let rule = match spec.curve {
        Curve::Spin { scale } => TransformRule::Spin {
            delta: (AXIAL_TILT_STEP * scale) as f32,
        },
        Curve::Resolution => return Err(SetupError::UnsupportedCurve(label)),
        ref curve => {
            let clock = resolve_clock(clocks, &label, spec.clock.as_deref())?;
            let curve = CurveFn::from_curve(curve).ok_or(SetupError::UnsupportedCurve(label))?;
            TransformRule::Clock { clock, curve }
        }
    };
    Ok(TransformBinding {
        object,
        property: spec.property,
        rule,
    })
}

pub(crate) fn compile_pulse(
    spec: &GeometryPulseSpec,
    scene: &Scene,
    clocks: &Clocks,
) -> Result<GeometryPulse, SetupError> {
    let object = scene
        .object_id(&spec.object)
        .ok_or_else(|| SetupError::UnknownObject(spec.object.clone()))?;
    if !matches!(scene.object_by_id(object).geometry, Geometry::Text(_)) {
        return Err(SetupError::PulseTarget(spec.object.clone()));
    }
    let clock = clocks
        .id(&spec.clock)
        .ok_or_else(|| SetupError::UnknownClock(spec.clock.clone()))?;
    Ok(GeometryPulse {
        object,
        clock,
        curve: CurveFn::Oscillate {
            base: f64::from(spec.base),
            amplitude: f64::from(spec.amplitude),
            frequency: f64::from(spec.frequency),
            wave: sceneconfig::Wave::Sin,
        },
        bevel_fraction: spec.bevel_fraction,
        regenerate: spec.regenerate,
    })
}
