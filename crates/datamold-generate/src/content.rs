use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, RngCore};

/// Source of locale-aware fake content used by `string` and `date` leaves.
///
/// Implementations draw all randomness from the supplied `rng` so that seeded
/// runs stay reproducible.
pub trait ContentProvider: Send + Sync {
    /// A sentence or short paragraph of prose.
    fn text(&self, rng: &mut dyn RngCore) -> String;

    /// A full person name.
    fn name(&self, rng: &mut dyn RngCore) -> String;

    /// A postal address, possibly spanning several lines.
    fn address(&self, rng: &mut dyn RngCore) -> String;

    /// A timestamp in `[start, end)`. Callers guarantee `start < end`.
    fn timestamp_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> DateTime<Utc> {
        uniform_timestamp(start, end, rng)
    }
}

/// Draw uniformly at microsecond resolution, falling back to whole seconds
/// when the span does not fit in an `i64` of microseconds.
pub fn uniform_timestamp(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> DateTime<Utc> {
    let span = end - start;
    if span <= TimeDelta::zero() {
        return start;
    }
    let offset = match span.num_microseconds() {
        Some(micros) => TimeDelta::microseconds(rng.random_range(0..micros)),
        None => TimeDelta::seconds(rng.random_range(0..span.num_seconds())),
    };
    start.checked_add_signed(offset).unwrap_or(start)
}
