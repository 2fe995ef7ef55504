use sceneconfig::{Curve, Wave};

/// Pure function of a clock value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveFn {
    Linear {
        scale: f64,
        offset: f64,
    },
    Oscillate {
        base: f64,
        amplitude: f64,
        frequency: f64,
        wave: Wave,
    },
}

impl CurveFn {
    /// Returns the clock-driven part of a config curve, if it has one.
    pub fn from_curve(curve: &Curve) -> Option<Self> {
        match *curve {
            Curve::Clock { scale, offset } => Some(CurveFn::Linear { scale, offset }),
            Curve::Oscillate {
                base,
                amplitude,
                frequency,
                wave,
            } => Some(CurveFn::Oscillate {
                base,
                amplitude,
                frequency,
                wave,
            }),
            Curve::Spin { .. } | Curve::Resolution => None,
        }
    }

    pub fn sample(&self, t: f64) -> f64 {
        match *self {
            CurveFn::Linear { scale, offset } => offset + scale * t,
            CurveFn::Oscillate {
                base,
                amplitude,
                frequency,
                wave,
            } => base + amplitude * wave.apply(t * frequency),
        }
    }

    /// Closed range the curve can reach, when it is bounded.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            CurveFn::Linear { .. } => None,
            CurveFn::Oscillate {
                base, amplitude, ..
            } => {
                let reach = amplitude.abs();
                Some((base - reach, base + reach))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity_by_default() {
        let curve = CurveFn::from_curve(&Curve::Clock {
            scale: 1.0,
            offset: 0.0,
        })
        .unwrap();
        assert_eq!(curve.sample(1.25), 1.25);
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let curve = CurveFn::Oscillate {
            base: 1.0,
            amplitude: 0.2,
            frequency: 1.0,
            wave: Wave::Sin,
        };
        let (low, high) = curve.bounds().unwrap();
        for step in 0..10_000 {
            let z = curve.sample(step as f64 * 0.05);
            assert!(z >= low - 1e-12 && z <= high + 1e-12, "z={z}");
        }
    }

    #[test]
    fn frequency_scales_time() {
        let curve = CurveFn::Oscillate {
            base: 0.1,
            amplitude: 0.1,
            frequency: 0.5,
            wave: Wave::Sin,
        };
        let t = std::f64::consts::PI;
        assert!((curve.sample(t) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn spin_and_resolution_are_not_clock_curves() {
        assert!(CurveFn::from_curve(&Curve::Spin { scale: 0.01 }).is_none());
        assert!(CurveFn::from_curve(&Curve::Resolution).is_none());
    }
}
