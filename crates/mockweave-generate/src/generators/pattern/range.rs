use rand::{Rng, RngCore};

use mockweave_core::RangeSpec;

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

/// Highest supported decimal precision.
pub const MAX_PRECISION: u32 = 15;

/// Bound on `|value| * 10^precision` so scaled values stay exact in `i64` and `f64`.
const MAX_SCALED_MAGNITUDE: f64 = 9.0e15;

/// Sampler for a validated numeric range.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSampler {
    Constant(GeneratedValue),
    /// Integers in `[lo, hi]`.
    Int { lo: i64, hi: i64 },
    /// Multiples of `10^-precision`, stored as scaled integers in `[lo, hi]`.
    Scaled { lo: i64, hi: i64, scale: f64 },
}

impl RangeSampler {
    /// Without an explicit precision, integers are sampled when one lies in
    /// the range. Otherwise the fewest decimal places that fit a value are used.
    pub fn compile(spec: &RangeSpec) -> Result<Self, GenerationError> {
        let RangeSpec { min, max, .. } = *spec;

        if !min.is_finite() || !max.is_finite() {
            return Err(GenerationError::InvalidRange(format!(
                "bounds must be finite, got min={min} max={max}"
            )));
        }
        if min > max {
            return Err(GenerationError::InvalidRange(format!(
                "min must be <= max, got min={min} max={max}"
            )));
        }

        let Some(precision) = spec.precision else {
            return Ok(Self::with_implicit_precision(min, max));
        };
        if precision > MAX_PRECISION {
            return Err(GenerationError::InvalidRange(format!(
                "precision must be <= {MAX_PRECISION}, got {precision}"
            )));
        }
        if !fits_precision(min, max, precision) {
            return Err(GenerationError::InvalidRange(format!(
                "bounds min={min} max={max} are too large for precision {precision}"
            )));
        }

        let scale = 10_f64.powi(precision as i32);
        if min == max {
            let value = if precision == 0 && min.fract() == 0.0 {
                GeneratedValue::Int(min as i64)
            } else if precision == 0 {
                GeneratedValue::Float(min)
            } else {
                GeneratedValue::Float((min * scale).round() / scale)
            };
            return Ok(RangeSampler::Constant(value));
        }

        let (lo, hi) = scaled_bounds(min, max, scale);
        if lo > hi {
            return Err(GenerationError::InvalidRange(format!(
                "precision {precision} leaves no value within [{min}, {max}]"
            )));
        }
        Ok(Self::scaled(precision, lo, hi, scale))
    }

    fn with_implicit_precision(min: f64, max: f64) -> Self {
        if min == max {
            if min.fract() == 0.0 && fits_precision(min, max, 0) {
                return RangeSampler::Constant(GeneratedValue::Int(min as i64));
            }
            return RangeSampler::Constant(GeneratedValue::Float(min));
        }
        for precision in 0..=MAX_PRECISION {
            if !fits_precision(min, max, precision) {
                break;
            }
            let scale = 10_f64.powi(precision as i32);
            let (lo, hi) = scaled_bounds(min, max, scale);
            if lo <= hi {
                return Self::scaled(precision, lo, hi, scale);
            }
        }
        // The bounds are too close to hold any decimal value.
        RangeSampler::Constant(GeneratedValue::Float(min))
    }

    fn scaled(precision: u32, lo: i64, hi: i64, scale: f64) -> Self {
        if precision == 0 {
            RangeSampler::Int { lo, hi }
        } else {
            RangeSampler::Scaled { lo, hi, scale }
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> GeneratedValue {
        match self {
            RangeSampler::Constant(value) => value.clone(),
            RangeSampler::Int { lo, hi } => GeneratedValue::Int(rng.random_range(*lo..=*hi)),
            RangeSampler::Scaled { lo, hi, scale } => {
                let units = rng.random_range(*lo..=*hi);
                GeneratedValue::Float(units as f64 / scale)
            }
        }
    }
}

fn fits_precision(min: f64, max: f64, precision: u32) -> bool {
    let scale = 10_f64.powi(precision as i32);
    min.abs() * scale <= MAX_SCALED_MAGNITUDE && max.abs() * scale <= MAX_SCALED_MAGNITUDE
}

fn scaled_bounds(min: f64, max: f64, scale: f64) -> (i64, i64) {
    ((min * scale).ceil() as i64, (max * scale).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn decimals(value: f64) -> usize {
        let text = value.to_string();
        text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
    }

    #[test]
    fn constant_range_returns_constant() {
        let sampler = RangeSampler::compile(&RangeSpec::new(5.0, 5.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(sampler.sample(&mut rng), GeneratedValue::Int(5));
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = RangeSampler::compile(&RangeSpec::new(10.0, 1.0)).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRange(_)));
    }

    #[test]
    fn integer_range_stays_in_bounds() {
        let sampler = RangeSampler::compile(&RangeSpec::new(-3.0, 3.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            let value = sampler.sample(&mut rng).as_i64().unwrap();
            assert!((-3..=3).contains(&value));
            seen.insert(value);
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn precision_rounds_to_decimal_places() {
        let sampler =
            RangeSampler::compile(&RangeSpec::new(0.5, 99.99).with_precision(2)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let value = sampler.sample(&mut rng);
            let GeneratedValue::Float(value) = value else {
                panic!("expected float, got {value:?}");
            };
            assert!((0.5..=99.99).contains(&value));
            assert!(decimals(value) <= 2, "{value}");
        }
    }

    #[test]
    fn fractional_bounds_without_precision_use_decimals() {
        let sampler = RangeSampler::compile(&RangeSpec::new(1.2, 1.8)).unwrap();
        assert_eq!(sampler, RangeSampler::Scaled { lo: 12, hi: 18, scale: 10.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..200 {
            let GeneratedValue::Float(value) = sampler.sample(&mut rng) else {
                panic!("expected float");
            };
            assert!((1.2..=1.8).contains(&value), "{value}");
            assert!(decimals(value) <= 1, "{value}");
        }

        let sampler = RangeSampler::compile(&RangeSpec::new(0.25, 0.26)).unwrap();
        assert_eq!(sampler, RangeSampler::Scaled { lo: 25, hi: 26, scale: 100.0 });
        assert_eq!(
            RangeSampler::compile(&RangeSpec::new(1.5, 1.5)).unwrap(),
            RangeSampler::Constant(GeneratedValue::Float(1.5))
        );
    }

    #[test]
    fn explicit_precision_without_representable_value_is_rejected() {
        let err = RangeSampler::compile(&RangeSpec::new(1.2, 1.8).with_precision(0)).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRange(message) if message.contains("precision 0")));
        assert!(RangeSampler::compile(&RangeSpec::new(1.2, 1.8).with_precision(1)).is_ok());
    }

    #[test]
    fn rejects_excessive_precision() {
        let err = RangeSampler::compile(&RangeSpec::new(0.0, 1.0).with_precision(16)).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRange(_)));
    }
}
