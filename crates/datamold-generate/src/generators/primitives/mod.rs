use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use serde_json::{Map, Value};

use crate::dates::{DateExpression, DateRangeResolver};
use crate::errors::GenerationError;
use crate::generators::{
    CheckContext, GeneratedValue, Generator, GeneratorContext, choose_option,
};
use crate::model::GenerationSettings;
use crate::params::{ParamKind, ParamSpec, read_params};

const DEFAULT_FLOAT_MIN: f64 = 0.0;
const DEFAULT_FLOAT_MAX: f64 = 10000.0;
const DEFAULT_MIN_DATE: &str = "-100y";
const DEFAULT_MAX_DATE: &str = "now";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const STRING_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min_length", ParamKind::Int),
    ParamSpec::new("max_length", ParamKind::Int),
    ParamSpec::new("options", ParamKind::StringList),
    ParamSpec::new("content", ParamKind::String),
];
const INTEGER_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Int),
    ParamSpec::new("max", ParamKind::Int),
    ParamSpec::new("options", ParamKind::IntList),
];
const FLOAT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float),
    ParamSpec::new("max", ParamKind::Float),
    ParamSpec::new("options", ParamKind::FloatList),
];
const DATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min_date", ParamKind::Date),
    ParamSpec::new("max_date", ParamKind::Date),
    ParamSpec::new("options", ParamKind::DateList),
];

pub fn builtin_generators() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(StringGenerator),
        Box::new(IntegerGenerator),
        Box::new(FloatGenerator),
        Box::new(DateGenerator),
    ]
}

/// Kind of text a `string` leaf produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    Random,
    Text,
    Name,
    Address,
}

impl Content {
    fn parse(value: &str, path: &str) -> Result<Self, GenerationError> {
        match value {
            "random" => Ok(Self::Random),
            "text" => Ok(Self::Text),
            "name" => Ok(Self::Name),
            "address" => Ok(Self::Address),
            other => Err(GenerationError::InvalidConstraint(format!(
                "{path}: unknown content '{other}' (expected random, text, name or address)"
            ))),
        }
    }
}

/// Checked constraints of a `string` leaf.
enum StringPlan<'s> {
    Options(&'s [Value]),
    Content {
        content: Content,
        min_len: usize,
        max_len: usize,
    },
}

fn plan_string<'s>(
    spec: &'s Map<String, Value>,
    path: &str,
    settings: &GenerationSettings,
) -> Result<StringPlan<'s>, GenerationError> {
    let params = read_params(spec, STRING_PARAMS, path)?;
    if let Some(options) = params.get_list("options") {
        return Ok(StringPlan::Options(options));
    }

    let min_len = params.get_length("min_length", 0, path)?;
    let max_len = params.get_length("max_length", settings.string_max_length, path)?;
    if min_len > max_len {
        return Err(GenerationError::InvalidConstraint(format!(
            "{path}: min_length must be <= max_length"
        )));
    }

    let content = match params.get_str("content") {
        Some(value) => Content::parse(value, path)?,
        None => Content::Random,
    };
    Ok(StringPlan::Content {
        content,
        min_len,
        max_len,
    })
}

struct StringGenerator;

impl Generator for StringGenerator {
    fn id(&self) -> &'static str {
        "string"
    }

    fn params(&self) -> &'static [ParamSpec] {
        STRING_PARAMS
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        spec: &Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let (content, min_len, max_len) = match plan_string(spec, ctx.path, ctx.settings)? {
            StringPlan::Options(options) => {
                let chosen = choose_option(options, rng, ctx.path)?;
                return Ok(GeneratedValue::Text(option_str(chosen, ctx.path)?.to_string()));
            }
            StringPlan::Content {
                content,
                min_len,
                max_len,
            } => (content, min_len, max_len),
        };

        let value = match content {
            Content::Random => random_alphanumeric(min_len, max_len, rng),
            Content::Text => bounded_text(ctx, min_len, max_len, rng),
            Content::Name => ctx.content.name(rng),
            Content::Address => ctx.content.address(rng),
        };
        Ok(GeneratedValue::Text(value))
    }

    fn check_constraints(
        &self,
        ctx: &CheckContext<'_>,
        spec: &Map<String, Value>,
    ) -> Result<(), GenerationError> {
        plan_string(spec, ctx.path, ctx.settings).map(|_| ())
    }
}

fn random_alphanumeric(min_len: usize, max_len: usize, rng: &mut dyn RngCore) -> String {
    let len = if min_len == max_len {
        min_len
    } else {
        rng.random_range(min_len..max_len)
    };
    (0..len)
        .map(|_| ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

/// Truncate to `max_len`, then extend past `min_len` with more text.
fn bounded_text(
    ctx: &GeneratorContext<'_>,
    min_len: usize,
    max_len: usize,
    rng: &mut dyn RngCore,
) -> String {
    let mut text = ctx.content.text(rng);
    if text.chars().count() > max_len {
        text = text.chars().take(max_len).collect();
    }
    let mut len = text.chars().count();
    while len < min_len {
        let more = ctx.content.text(rng);
        text.push(' ');
        text.push_str(&more);
        len += 1 + more.chars().count();
    }
    text
}

/// Checked constraints of a numeric leaf.
enum RangePlan<'s, T> {
    Options(&'s [Value]),
    Range(T, T),
}

fn plan_integer<'s>(
    spec: &'s Map<String, Value>,
    path: &str,
) -> Result<RangePlan<'s, i64>, GenerationError> {
    let params = read_params(spec, INTEGER_PARAMS, path)?;
    if let Some(options) = params.get_list("options") {
        return Ok(RangePlan::Options(options));
    }

    let min = params.get_i64("min").unwrap_or(i64::MIN);
    let max = params.get_i64("max").unwrap_or(i64::MAX);
    if min >= max {
        return Err(GenerationError::InvalidConstraint(format!(
            "{path}: min must be < max"
        )));
    }
    Ok(RangePlan::Range(min, max))
}

struct IntegerGenerator;

impl Generator for IntegerGenerator {
    fn id(&self) -> &'static str {
        "integer"
    }

    fn params(&self) -> &'static [ParamSpec] {
        INTEGER_PARAMS
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        spec: &Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        match plan_integer(spec, ctx.path)? {
            RangePlan::Options(options) => {
                let chosen = choose_option(options, rng, ctx.path)?;
                let value = chosen.as_i64().ok_or_else(|| option_kind_error(ctx.path))?;
                Ok(GeneratedValue::Int(value))
            }
            RangePlan::Range(min, max) => Ok(GeneratedValue::Int(rng.random_range(min..max))),
        }
    }

    fn check_constraints(
        &self,
        ctx: &CheckContext<'_>,
        spec: &Map<String, Value>,
    ) -> Result<(), GenerationError> {
        plan_integer(spec, ctx.path).map(|_| ())
    }
}

fn plan_float<'s>(
    spec: &'s Map<String, Value>,
    path: &str,
) -> Result<RangePlan<'s, f64>, GenerationError> {
    let params = read_params(spec, FLOAT_PARAMS, path)?;
    if let Some(options) = params.get_list("options") {
        return Ok(RangePlan::Options(options));
    }

    let min = params.get_f64("min").unwrap_or(DEFAULT_FLOAT_MIN);
    let max = params.get_f64("max").unwrap_or(DEFAULT_FLOAT_MAX);
    if !min.is_finite() || !max.is_finite() || !(max - min).is_finite() {
        return Err(GenerationError::InvalidConstraint(format!(
            "{path}: min and max must be finite and their span representable"
        )));
    }
    if min >= max {
        return Err(GenerationError::InvalidConstraint(format!(
            "{path}: min must be < max"
        )));
    }
    Ok(RangePlan::Range(min, max))
}

struct FloatGenerator;

impl Generator for FloatGenerator {
    fn id(&self) -> &'static str {
        "float"
    }

    fn params(&self) -> &'static [ParamSpec] {
        FLOAT_PARAMS
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        spec: &Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        match plan_float(spec, ctx.path)? {
            RangePlan::Options(options) => {
                let chosen = choose_option(options, rng, ctx.path)?;
                let value = chosen.as_f64().ok_or_else(|| option_kind_error(ctx.path))?;
                Ok(GeneratedValue::Float(value))
            }
            RangePlan::Range(min, max) => Ok(GeneratedValue::Float(rng.random_range(min..max))),
        }
    }

    fn check_constraints(
        &self,
        ctx: &CheckContext<'_>,
        spec: &Map<String, Value>,
    ) -> Result<(), GenerationError> {
        plan_float(spec, ctx.path).map(|_| ())
    }
}

/// Checked constraints of a `date` leaf, resolved against `now`.
enum DatePlan<'s> {
    /// Options are returned as written; each must parse as an expression.
    Options(&'s [Value]),
    Range(DateTime<Utc>, DateTime<Utc>),
}

fn plan_date<'s>(
    spec: &'s Map<String, Value>,
    path: &str,
    now: DateTime<Utc>,
) -> Result<DatePlan<'s>, GenerationError> {
    let params = read_params(spec, DATE_PARAMS, path)?;
    if let Some(options) = params.get_list("options") {
        for option in options {
            DateExpression::parse(option_str(option, path)?)?;
        }
        return Ok(DatePlan::Options(options));
    }

    let min_date = params.get_str("min_date").unwrap_or(DEFAULT_MIN_DATE);
    let max_date = params.get_str("max_date").unwrap_or(DEFAULT_MAX_DATE);
    let (min, max) = DateRangeResolver::new(now).resolve_range(min_date, max_date)?;
    if min >= max {
        return Err(GenerationError::InvalidConstraint(format!(
            "{path}: min_date '{min_date}' must resolve before max_date '{max_date}'"
        )));
    }
    Ok(DatePlan::Range(min, max))
}

struct DateGenerator;

impl Generator for DateGenerator {
    fn id(&self) -> &'static str {
        "date"
    }

    fn params(&self) -> &'static [ParamSpec] {
        DATE_PARAMS
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        spec: &Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        match plan_date(spec, ctx.path, ctx.now)? {
            DatePlan::Options(options) => {
                let chosen = choose_option(options, rng, ctx.path)?;
                Ok(GeneratedValue::Text(option_str(chosen, ctx.path)?.to_string()))
            }
            DatePlan::Range(min, max) => Ok(GeneratedValue::Timestamp(
                ctx.content.timestamp_between(min, max, rng),
            )),
        }
    }

    fn check_constraints(
        &self,
        ctx: &CheckContext<'_>,
        spec: &Map<String, Value>,
    ) -> Result<(), GenerationError> {
        plan_date(spec, ctx.path, ctx.now).map(|_| ())
    }
}

fn option_str<'v>(value: &'v Value, path: &str) -> Result<&'v str, GenerationError> {
    value.as_str().ok_or_else(|| option_kind_error(path))
}

fn option_kind_error(path: &str) -> GenerationError {
    GenerationError::InvalidConstraint(format!("{path}: option has the wrong kind"))
}
