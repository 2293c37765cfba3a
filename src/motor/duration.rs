// Hold durations: defaults per axis and the ceiling for explicit requests

use std::time::Duration;

use super::command::{Axis, Command};
use super::error::{DriveError, Result};

pub const DEFAULT_DRIVE_DURATION: Duration = Duration::from_secs(2);
pub const DEFAULT_TURN_DURATION: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationPolicy {
    /// Default hold for FORWARD/BACKWARD
    pub drive: Duration,
    /// Default hold for LEFT/RIGHT
    pub turn: Duration,
    /// Upper bound for any explicit hold
    pub max: Duration,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            drive: DEFAULT_DRIVE_DURATION,
            turn: DEFAULT_TURN_DURATION,
            max: DEFAULT_MAX_DURATION,
        }
    }
}

impl DurationPolicy {
    pub fn new(drive: Duration, turn: Duration, max: Duration) -> Self {
        Self { drive, turn, max }
    }

    /// Build from seconds, as they arrive from the command line
    pub fn from_secs_f64(drive: f64, turn: f64, max: f64) -> Result<Self> {
        let convert = |name: &str, secs: f64| {
            Duration::try_from_secs_f64(secs).map_err(|e| {
                DriveError::Configuration(format!("{} duration {} is invalid: {}", name, secs, e))
            })
        };
        let policy = Self::new(
            convert("drive", drive)?,
            convert("turn", turn)?,
            convert("max", max)?,
        );
        policy.validate()?;
        Ok(policy)
    }

    /// Check `0 < drive, turn <= max`
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("drive", self.drive), ("turn", self.turn)] {
            if value.is_zero() {
                return Err(DriveError::Configuration(format!(
                    "{} duration must be positive",
                    name
                )));
            }
            if value > self.max {
                return Err(DriveError::Configuration(format!(
                    "{} duration {:?} exceeds max duration {:?}",
                    name, value, self.max
                )));
            }
        }
        Ok(())
    }

    /// Default hold for a command's axis; STOP has none
    pub fn default_for(&self, command: Command) -> Option<Duration> {
        command.axis().map(|axis| match axis {
            Axis::Drive => self.drive,
            Axis::Turn => self.turn,
        })
    }

    /// Resolve the hold in seconds for a motion command
    ///
    /// An explicit request is used verbatim once it is finite, positive and
    /// within `max`; out-of-range values are rejected, never clamped.
    pub fn resolve(&self, command: Command, requested: Option<f64>) -> Result<f64> {
        let Some(value) = requested else {
            return self
                .default_for(command)
                .map(|d| d.as_secs_f64())
                .ok_or_else(|| DriveError::InvalidCommand("STOP takes no duration".to_string()));
        };

        if !value.is_finite() {
            return Err(DriveError::InvalidDuration(
                "Duration must be finite".to_string(),
            ));
        }
        if value <= 0.0 {
            return Err(DriveError::InvalidDuration(
                "Duration must be positive".to_string(),
            ));
        }
        let max = self.max.as_secs_f64();
        if value > max {
            return Err(DriveError::DurationTooLong {
                requested: value,
                max,
            });
        }
        Ok(value)
    }
}
