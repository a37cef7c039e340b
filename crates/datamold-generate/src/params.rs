use std::fmt;

use serde_json::{Map, Value};

use datamold_core::{TYPE_KEY, ValidationIssue, child_path, kind_name};

use crate::dates::DateExpression;
use crate::errors::GenerationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    String,
    Date,
    IntList,
    FloatList,
    StringList,
    DateList,
}

impl ParamKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamKind::Int => value.as_i64().is_some(),
            ParamKind::Float => value.as_f64().is_some(),
            ParamKind::String | ParamKind::Date => value.is_string(),
            ParamKind::IntList => list_of(value, |item| item.as_i64().is_some()),
            ParamKind::FloatList => list_of(value, |item| item.as_f64().is_some()),
            ParamKind::StringList | ParamKind::DateList => list_of(value, Value::is_string),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Int => "an integer",
            ParamKind::Float => "a number",
            ParamKind::String => "a string",
            ParamKind::Date => "a date expression",
            ParamKind::IntList => "a list of integers",
            ParamKind::FloatList => "a list of numbers",
            ParamKind::StringList => "a list of strings",
            ParamKind::DateList => "a list of date expressions",
        };
        f.write_str(name)
    }
}

/// One recognized constraint key of a generator.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn new(key: &'static str, kind: ParamKind) -> Self {
        Self { key, kind }
    }
}

/// Constraint set whose recognized keys have been kind-checked.
pub struct ParamMap<'a> {
    map: &'a Map<String, Value>,
}

/// Check the recognized keys of a leaf spec.
///
/// Unrecognized keys are ignored here; `check_params` reports them.
pub fn read_params<'a>(
    spec: &'a Map<String, Value>,
    specs: &[ParamSpec],
    path: &str,
) -> Result<ParamMap<'a>, GenerationError> {
    for param in specs {
        if let Some(value) = spec.get(param.key)
            && !param.kind.accepts(value)
        {
            return Err(GenerationError::InvalidConstraint(format!(
                "{path}: '{}' must be {}, found {}",
                param.key,
                param.kind,
                kind_name(value)
            )));
        }
    }
    Ok(ParamMap { map: spec })
}

/// Kind and unknown-key issues for a leaf spec. `Generator::check` adds the
/// generator's own constraint checks on top.
pub fn check_params(
    spec: &Map<String, Value>,
    specs: &[ParamSpec],
    generator_id: &str,
    path: &str,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (key, value) in spec {
        if key == TYPE_KEY {
            continue;
        }
        let param_path = child_path(path, key);
        let Some(param) = specs.iter().find(|param| param.key == key.as_str()) else {
            issues.push(ValidationIssue::warning(
                "unknown_constraint",
                param_path,
                format!("'{key}' is not a constraint of '{generator_id}' and is ignored"),
            ));
            continue;
        };

        if !param.kind.accepts(value) {
            issues.push(ValidationIssue::error(
                "invalid_constraint",
                param_path,
                format!("'{key}' must be {}, found {}", param.kind, kind_name(value)),
            ));
            continue;
        }

        match (param.kind, value) {
            (_, Value::Array(items)) if items.is_empty() => {
                issues.push(ValidationIssue::error(
                    "invalid_constraint",
                    param_path,
                    format!("'{key}' must not be empty"),
                ));
            }
            (ParamKind::Date, Value::String(expr)) => {
                if DateExpression::parse(expr).is_err() {
                    issues.push(invalid_date_issue(param_path, expr));
                }
            }
            (ParamKind::DateList, Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    if let Some(expr) = item.as_str()
                        && DateExpression::parse(expr).is_err()
                    {
                        issues.push(invalid_date_issue(
                            child_path(&param_path, &idx.to_string()),
                            expr,
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    issues
}

impl<'a> ParamMap<'a> {
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.map.get(key).and_then(|value| value.as_i64())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.map.get(key).and_then(|value| value.as_f64())
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(|value| value.as_str())
    }

    pub fn get_list(&self, key: &str) -> Option<&'a [Value]> {
        self.map
            .get(key)
            .and_then(|value| value.as_array())
            .map(Vec::as_slice)
    }

    /// Non-negative length bound, or `default` when absent.
    pub fn get_length(
        &self,
        key: &str,
        default: usize,
        path: &str,
    ) -> Result<usize, GenerationError> {
        match self.get_i64(key) {
            None => Ok(default),
            Some(value) => usize::try_from(value).map_err(|_| {
                GenerationError::InvalidConstraint(format!("{path}: '{key}' must be >= 0"))
            }),
        }
    }
}

fn list_of(value: &Value, accepts: impl Fn(&Value) -> bool) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(accepts))
}

/// Error issue for a constraint a generator refused.
pub fn constraint_issue(err: &GenerationError, path: &str) -> ValidationIssue {
    let code = match err {
        GenerationError::InvalidDateExpression(_) => "invalid_date_expression",
        _ => "invalid_constraint",
    };
    ValidationIssue::error(code, path, err.to_string())
}

fn invalid_date_issue(path: String, expr: &str) -> ValidationIssue {
    ValidationIssue::error(
        "invalid_date_expression",
        path,
        format!("'{expr}' is not 'now', an absolute timestamp, or a relative offset"),
    )
}
