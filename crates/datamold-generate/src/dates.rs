//! Bound expressions for `date` leaves.
//!
//! An expression is `now`, an absolute timestamp, or a signed relative offset
//! built from `<N><unit>` components (`-10d`, `+1y6M`, `100y`).

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::errors::GenerationError;

/// Unit of one relative offset component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl DateUnit {
    fn from_char(unit: char) -> Option<Self> {
        match unit {
            'y' => Some(Self::Year),
            'M' => Some(Self::Month),
            'w' => Some(Self::Week),
            'd' => Some(Self::Day),
            'h' => Some(Self::Hour),
            'm' => Some(Self::Minute),
            's' => Some(Self::Second),
            _ => None,
        }
    }
}

/// Parsed bound expression, independent of the reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateExpression {
    Now,
    Absolute(DateTime<Utc>),
    Relative {
        negative: bool,
        components: Vec<(i64, DateUnit)>,
    },
}

impl DateExpression {
    pub fn parse(input: &str) -> Result<Self, GenerationError> {
        let trimmed = input.trim();
        if trimmed == "now" {
            return Ok(Self::Now);
        }
        if let Some(instant) = parse_absolute(trimmed) {
            return Ok(Self::Absolute(instant));
        }
        parse_relative(trimmed).ok_or_else(|| invalid(input))
    }

    /// Resolve against `now`; calendar units use month arithmetic.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Now => Some(now),
            Self::Absolute(instant) => Some(*instant),
            Self::Relative {
                negative,
                components,
            } => {
                let mut months: u32 = 0;
                let mut delta = TimeDelta::zero();
                for &(amount, unit) in components {
                    let step = match unit {
                        DateUnit::Year => {
                            let years = u32::try_from(amount).ok()?;
                            months = months.checked_add(years.checked_mul(12)?)?;
                            continue;
                        }
                        DateUnit::Month => {
                            months = months.checked_add(u32::try_from(amount).ok()?)?;
                            continue;
                        }
                        DateUnit::Week => TimeDelta::try_weeks(amount)?,
                        DateUnit::Day => TimeDelta::try_days(amount)?,
                        DateUnit::Hour => TimeDelta::try_hours(amount)?,
                        DateUnit::Minute => TimeDelta::try_minutes(amount)?,
                        DateUnit::Second => TimeDelta::try_seconds(amount)?,
                    };
                    delta = delta.checked_add(&step)?;
                }
                if *negative {
                    now.checked_sub_months(Months::new(months))?
                        .checked_sub_signed(delta)
                } else {
                    now.checked_add_months(Months::new(months))?
                        .checked_add_signed(delta)
                }
            }
        }
    }
}

/// Resolves bound expressions against one reference instant.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeResolver {
    now: DateTime<Utc>,
}

impl DateRangeResolver {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn resolve(&self, input: &str) -> Result<DateTime<Utc>, GenerationError> {
        DateExpression::parse(input)?
            .resolve(self.now)
            .ok_or_else(|| invalid(input))
    }

    /// Resolve both bounds of a half-open interval.
    pub fn resolve_range(
        &self,
        min: &str,
        max: &str,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), GenerationError> {
        Ok((self.resolve(min)?, self.resolve(max)?))
    }
}

pub fn parse_absolute(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn parse_relative(value: &str) -> Option<DateExpression> {
    let (negative, body) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    let mut components = Vec::new();
    let mut digits = String::new();
    for ch in body.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit = DateUnit::from_char(ch)?;
        if digits.is_empty() {
            return None;
        }
        let amount: i64 = digits.parse().ok()?;
        components.push((amount, unit));
        digits.clear();
    }

    if !digits.is_empty() || components.is_empty() {
        return None;
    }

    Some(DateExpression::Relative {
        negative,
        components,
    })
}

fn invalid(input: &str) -> GenerationError {
    GenerationError::InvalidDateExpression(input.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn now_resolves_to_reference_instant() {
        let resolver = DateRangeResolver::new(reference());
        assert_eq!(resolver.resolve("now").unwrap(), reference());
    }

    #[test]
    fn relative_days_and_years() {
        let resolver = DateRangeResolver::new(reference());
        assert_eq!(
            resolver.resolve("-10d").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 21, 12, 0, 0).unwrap()
        );
        assert_eq!(
            resolver.resolve("100y").unwrap(),
            Utc.with_ymd_and_hms(2124, 3, 31, 12, 0, 0).unwrap()
        );
        assert_eq!(
            resolver.resolve("-100y").unwrap(),
            Utc.with_ymd_and_hms(1924, 3, 31, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn compound_offsets_clamp_to_month_end() {
        let resolver = DateRangeResolver::new(reference());
        assert_eq!(
            resolver.resolve("+1M2h").unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 30, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn absolute_formats() {
        let resolver = DateRangeResolver::new(reference());
        let expected = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();
        assert_eq!(resolver.resolve("2020-05-17T08:30:00Z").unwrap(), expected);
        assert_eq!(resolver.resolve("2020-05-17T08:30:00").unwrap(), expected);
        assert_eq!(resolver.resolve("2020-05-17 08:30:00").unwrap(), expected);
        assert_eq!(
            resolver.resolve("2020-05-17").unwrap(),
            Utc.with_ymd_and_hms(2020, 5, 17, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_unparseable_expressions() {
        let resolver = DateRangeResolver::new(reference());
        for input in ["", "yesterday", "-d", "10", "10x", "+", "5d3", "2020-13-01"] {
            assert!(
                matches!(
                    resolver.resolve(input),
                    Err(GenerationError::InvalidDateExpression(_))
                ),
                "expected '{input}' to be rejected"
            );
        }
    }

    #[test]
    fn rejects_offsets_outside_calendar_range() {
        let resolver = DateRangeResolver::new(reference());
        assert!(matches!(
            resolver.resolve("999999999y"),
            Err(GenerationError::InvalidDateExpression(_))
        ));
    }
}
