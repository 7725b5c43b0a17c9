//! Environment-driven configuration.

use std::str::FromStr;

use chrono::TimeDelta;
use classbook_booking::domain::policy::{
    BookingPolicy, DEFAULT_CANCELLATION_LEAD_TIME, DEFAULT_CREDITS_PER_BOOKING,
};
use classbook_core::dispatcher::DEFAULT_MAX_DISPATCH_EVENTS;

use crate::error::AppError;

/// Minutes of notice required to cancel a booking.
pub const CANCELLATION_LEAD_MINUTES_VAR: &str = "CLASSBOOK_CANCELLATION_LEAD_MINUTES";
/// Credits charged per booking.
pub const CREDITS_PER_BOOKING_VAR: &str = "CLASSBOOK_CREDITS_PER_BOOKING";
/// Cap on events delivered by one dispatch.
pub const MAX_DISPATCH_EVENTS_VAR: &str = "CLASSBOOK_MAX_DISPATCH_EVENTS";
/// `json` or `pretty`.
pub const LOG_FORMAT_VAR: &str = "CLASSBOOK_LOG_FORMAT";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(AppError::Config(format!(
                "{LOG_FORMAT_VAR} must be `json` or `pretty`, got `{other}`"
            ))),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Minimum notice for a cancellation, in minutes.
    pub cancellation_lead_minutes: i64,
    /// Credits charged per booking and refunded on cancellation.
    pub credits_per_booking: u32,
    /// Cap on events delivered by a single dispatch, follow-ups included.
    pub max_dispatch_events: usize,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cancellation_lead_minutes: DEFAULT_CANCELLATION_LEAD_TIME.num_minutes(),
            credits_per_booking: DEFAULT_CREDITS_PER_BOOKING,
            max_dispatch_events: DEFAULT_MAX_DISPATCH_EVENTS,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value cannot be parsed or is out of
    /// range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cancellation_lead_minutes: i64 = parse_or(
            &lookup,
            CANCELLATION_LEAD_MINUTES_VAR,
            defaults.cancellation_lead_minutes,
        )?;
        if cancellation_lead_minutes < 0 {
            return Err(AppError::Config(format!(
                "{CANCELLATION_LEAD_MINUTES_VAR} must not be negative"
            )));
        }

        let credits_per_booking: u32 =
            parse_or(&lookup, CREDITS_PER_BOOKING_VAR, defaults.credits_per_booking)?;
        if credits_per_booking == 0 {
            return Err(AppError::Config(format!(
                "{CREDITS_PER_BOOKING_VAR} must be greater than zero"
            )));
        }

        let max_dispatch_events: usize =
            parse_or(&lookup, MAX_DISPATCH_EVENTS_VAR, defaults.max_dispatch_events)?;
        if max_dispatch_events == 0 {
            return Err(AppError::Config(format!(
                "{MAX_DISPATCH_EVENTS_VAR} must be greater than zero"
            )));
        }

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            cancellation_lead_minutes,
            credits_per_booking,
            max_dispatch_events,
            log_format,
        })
    }

    /// The booking rules this configuration describes.
    #[must_use]
    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            cancellation_lead_time: TimeDelta::minutes(self.cancellation_lead_minutes),
            credits_per_booking: self.credits_per_booking,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
    }
}
