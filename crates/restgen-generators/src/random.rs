//! Uniform sampling from a parameter's declared domain.

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use restgen_core::{ParamType, Parameter, Schema};

/// Span used when a numeric bound is missing on one side.
const DEFAULT_SPAN: f64 = 1000.0;
const DEFAULT_MAX_LENGTH: usize = 10;

/// Samples values inside (or, on request, just outside) a declared domain:
/// type, format, enum, numeric range and string length.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSampler {
    param_type: ParamType,
    format: Option<String>,
    enum_values: Vec<String>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl RandomSampler {
    pub fn for_parameter(parameter: &Parameter) -> Self {
        RandomSampler {
            param_type: parameter.param_type,
            format: parameter.format.clone(),
            enum_values: parameter.enum_values.clone().unwrap_or_default(),
            minimum: parameter.minimum,
            maximum: parameter.maximum,
            min_length: parameter.min_length,
            max_length: parameter.max_length,
        }
    }

    /// Sampler for a body schema leaf (untyped leaves are strings).
    pub fn for_schema(schema: &Schema) -> Self {
        RandomSampler {
            param_type: schema.schema_type.unwrap_or(ParamType::String),
            format: None,
            enum_values: schema.enum_strings(),
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
        }
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    /// Declared numeric bounds; infinite and NaN bounds count as absent.
    fn finite_bounds(&self) -> (Option<f64>, Option<f64>) {
        (
            self.minimum.filter(|v| v.is_finite()),
            self.maximum.filter(|v| v.is_finite()),
        )
    }

    /// Bounds `[lo, hi]` for numeric sampling.
    fn numeric_bounds(&self) -> (f64, f64) {
        match self.finite_bounds() {
            (Some(lo), Some(hi)) if lo <= hi => (lo, hi),
            (Some(lo), Some(hi)) => (hi, lo),
            (Some(lo), None) => (lo, lo + DEFAULT_SPAN),
            (None, Some(hi)) => (hi - DEFAULT_SPAN, hi),
            (None, None) => (0.0, DEFAULT_SPAN),
        }
    }

    fn length_bounds(&self) -> (usize, usize) {
        let lo = self.min_length.unwrap_or(1);
        let hi = self
            .max_length
            .unwrap_or_else(|| lo.max(DEFAULT_MAX_LENGTH));
        if lo <= hi {
            (lo, hi)
        } else {
            (hi, lo)
        }
    }

    /// Draws a value from the declared domain.
    pub fn next_value(&mut self, rng: &mut ChaCha8Rng) -> String {
        if let Some(value) = self.enum_values.choose(rng) {
            return value.clone();
        }

        match self.param_type {
            ParamType::Boolean => rng.gen_bool(0.5).to_string(),
            ParamType::Integer => {
                let (lo, hi) = self.numeric_bounds();
                let (lo, hi) = (lo.ceil() as i64, hi.floor() as i64);
                if lo > hi {
                    lo.to_string()
                } else {
                    rng.gen_range(lo..=hi).to_string()
                }
            }
            ParamType::Number => {
                let (lo, hi) = self.numeric_bounds();
                // Interpolating stays finite even when `hi - lo` overflows.
                let u: f64 = rng.gen();
                let value = lo * (1.0 - u) + hi * u;
                // Two decimals keep values readable without leaving the range.
                let rounded = (value * 100.0).round() / 100.0;
                let value = if rounded.is_finite() { rounded } else { value };
                value.clamp(lo, hi).to_string()
            }
            ParamType::String => match self.format.as_deref() {
                Some(format) => formatted_value(format, rng)
                    .unwrap_or_else(|| self.random_string(rng)),
                None => self.random_string(rng),
            },
            ParamType::Array => {
                let count = rng.gen_range(1..=3);
                (0..count)
                    .map(|_| alphanumeric(rng, 5))
                    .collect::<Vec<_>>()
                    .join(",")
            }
            ParamType::Object => "{}".to_string(),
        }
    }

    /// Draws a value that violates the declared domain, if the domain is
    /// narrow enough to be violated.
    pub fn next_invalid_value(&mut self, rng: &mut ChaCha8Rng) -> Option<String> {
        if !self.enum_values.is_empty() {
            loop {
                let candidate = alphanumeric(rng, 8);
                if !self.enum_values.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }

        match self.param_type {
            ParamType::Integer => {
                let (lo, hi) = self.finite_bounds();
                let above = hi.and_then(|hi| (hi.floor() as i64).checked_add(rng.gen_range(1..=100)));
                let below = lo.and_then(|lo| (lo.ceil() as i64).checked_sub(rng.gen_range(1..=100)));
                Some(match above.or(below) {
                    Some(value) => value.to_string(),
                    None => wrong_type_literal(&["1.5", "abc", "true"], rng),
                })
            }
            ParamType::Number => {
                let (lo, hi) = self.finite_bounds();
                let above = hi.and_then(|hi| step_beyond(hi, 1.0, rng));
                let below = lo.and_then(|lo| step_beyond(lo, -1.0, rng));
                Some(match above.or(below) {
                    Some(value) => value.to_string(),
                    None => wrong_type_literal(&["not-a-number", "true"], rng),
                })
            }
            ParamType::Boolean => Some("maybe".to_string()),
            ParamType::String => {
                if let Some(max) = self.max_length {
                    let extra = rng.gen_range(1..=10);
                    Some(alphanumeric(rng, max + extra))
                } else if let Some(min) = self.min_length.filter(|m| *m > 1) {
                    let len = rng.gen_range(0..min);
                    Some(alphanumeric(rng, len))
                } else if self.format.is_some() {
                    // A random token never matches a structured format.
                    Some(format!("#{}", alphanumeric(rng, 8)))
                } else {
                    None
                }
            }
            ParamType::Array | ParamType::Object => None,
        }
    }

    fn random_string(&self, rng: &mut ChaCha8Rng) -> String {
        let (lo, hi) = self.length_bounds();
        let len = rng.gen_range(lo..=hi);
        alphanumeric(rng, len)
    }
}

/// A finite value strictly past `bound` in the direction of `sign`, or
/// `None` when the bound sits at the edge of the representable range.
fn step_beyond(bound: f64, sign: f64, rng: &mut ChaCha8Rng) -> Option<f64> {
    let candidate = bound + sign * rng.gen_range(1.0..100.0) * bound.abs().max(1.0);
    let beyond = if sign > 0.0 { candidate > bound } else { candidate < bound };
    (candidate.is_finite() && beyond).then_some(candidate)
}

fn wrong_type_literal(literals: &[&str], rng: &mut ChaCha8Rng) -> String {
    literals.choose(rng).map(|s| s.to_string()).unwrap_or_default()
}

fn alphanumeric(rng: &mut ChaCha8Rng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Values for the string formats commonly declared in interface descriptions.
fn formatted_value(format: &str, rng: &mut ChaCha8Rng) -> Option<String> {
    let value = match format {
        "date" => format!(
            "{:04}-{:02}-{:02}",
            rng.gen_range(1970..=2030),
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        ),
        "date-time" => format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            rng.gen_range(1970..=2030),
            rng.gen_range(1..=12),
            rng.gen_range(1..=28),
            rng.gen_range(0..24),
            rng.gen_range(0..60),
            rng.gen_range(0..60)
        ),
        "email" => format!(
            "{}@{}.com",
            alphanumeric(rng, 8).to_lowercase(),
            alphanumeric(rng, 6).to_lowercase()
        ),
        "uuid" => {
            let bytes: [u8; 16] = rng.gen();
            restgen_core::TestCaseId::from_random_bytes(bytes).to_string()
        }
        "uri" | "url" => format!(
            "https://{}.example.com/{}",
            alphanumeric(rng, 6).to_lowercase(),
            alphanumeric(rng, 4)
        ),
        "ipv4" => format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=254),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        ),
        _ => return None,
    };
    Some(value)
}
