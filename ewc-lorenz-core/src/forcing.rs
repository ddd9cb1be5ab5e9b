//! Forcing metadata consumed by the adapter.
//!
//! Forcing data itself is produced elsewhere. The adapter only reads the forcing parameter
//! `F`, the time step and the run period from it.

use crate::errors::{LorenzError, LorenzResult};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Forcing for a Lorenz-96 run
///
/// Times are ISO 8601 strings in UTC, e.g. `1997-08-01T00:00:00Z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorenzForcing {
    /// Forcing parameter of the Lorenz-96 equations
    #[serde(rename = "F")]
    pub f: f64,
    /// Model time step
    pub dt: f64,
    pub start_time: String,
    pub end_time: String,
    /// Directory holding the forcing files, if any
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl LorenzForcing {
    pub fn new(
        f: f64,
        dt: f64,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            f,
            dt,
            start_time: start_time.into(),
            end_time: end_time.into(),
            directory: None,
        }
    }

    pub fn start_time_as_datetime(&self) -> LorenzResult<DateTime<Utc>> {
        parse_utc_time(&self.start_time)
    }

    pub fn end_time_as_datetime(&self) -> LorenzResult<DateTime<Utc>> {
        parse_utc_time(&self.end_time)
    }

    /// Length of the forcing period in fractional days
    pub fn span_in_days(&self) -> LorenzResult<f64> {
        let delta = self.end_time_as_datetime()? - self.start_time_as_datetime()?;
        Ok(fractional_days(delta))
    }

    /// Check that `F` and `dt` are finite and that both times parse
    pub fn validate(&self) -> LorenzResult<()> {
        require_finite("F", self.f)?;
        require_finite("dt", self.dt)?;
        self.span_in_days().map(|_| ())
    }
}

fn require_finite(name: &'static str, value: f64) -> LorenzResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LorenzError::NonFiniteForcing { name, value })
    }
}

/// Parse an ISO 8601 timestamp that must be in UTC
///
/// Timestamps without an offset, or with a non-zero offset, are rejected.
pub fn parse_utc_time(value: &str) -> LorenzResult<DateTime<Utc>> {
    let time = DateTime::parse_from_rfc3339(value).map_err(|e| LorenzError::InvalidTime {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if time.offset().local_minus_utc() != 0 {
        return Err(LorenzError::InvalidTime {
            value: value.to_string(),
            reason: "time is not in UTC, use the form 'YYYY-MM-DDTHH:MM:SSZ'".to_string(),
        });
    }
    Ok(time.with_timezone(&Utc))
}

/// Express a duration as whole days plus the remaining seconds as a fraction of a day
///
/// Sub-second precision is dropped. Negative durations are floored to the whole second
/// before splitting so the seconds component is always in `[0, 86400)`.
pub fn fractional_days(delta: TimeDelta) -> f64 {
    let mut seconds = delta.num_seconds();
    if delta.subsec_nanos() < 0 {
        seconds -= 1;
    }
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let remainder = seconds.rem_euclid(SECONDS_PER_DAY);

    days as f64 + remainder as f64 / SECONDS_PER_DAY as f64
}
