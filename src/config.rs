// Key expressions, pin and duration defaults, command-line/environment overrides
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::gpio::sysfs::DEFAULT_SYSFS_ROOT;
use crate::gpio::PinId;
use crate::motor::error::Result;
use crate::motor::pins::{
    DEFAULT_BACKWARD_PIN, DEFAULT_FORWARD_PIN, DEFAULT_LEFT_PIN, DEFAULT_RIGHT_PIN,
};
use crate::motor::{DurationPolicy, PinAssignment};

// Zenoh key expressions
pub const KEY_CMD_DRIVE: &str = "rig/cmd/drive"; // drive queries
pub const KEY_HEALTH: &str = "rig/state/health"; // health status

// Default hold durations in seconds
pub const DEFAULT_DRIVE_SECS: f64 = 2.0;
pub const DEFAULT_TURN_SECS: f64 = 1.0;
pub const DEFAULT_MAX_SECS: f64 = 5.0;

/// Which GPIO backend drives the lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// In-memory lines, no hardware (dry run)
    Sim,
    /// Linux sysfs GPIO
    Sysfs,
}

/// Drive rig runtime
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Line for the forward winding
    #[arg(long, env = "RIG_PIN_FORWARD", default_value_t = DEFAULT_FORWARD_PIN)]
    pub forward_pin: PinId,

    /// Line for the backward winding
    #[arg(long, env = "RIG_PIN_BACKWARD", default_value_t = DEFAULT_BACKWARD_PIN)]
    pub backward_pin: PinId,

    /// Line for the left winding
    #[arg(long, env = "RIG_PIN_LEFT", default_value_t = DEFAULT_LEFT_PIN)]
    pub left_pin: PinId,

    /// Line for the right winding
    #[arg(long, env = "RIG_PIN_RIGHT", default_value_t = DEFAULT_RIGHT_PIN)]
    pub right_pin: PinId,

    /// Default hold for FORWARD/BACKWARD, seconds
    #[arg(long, env = "RIG_DRIVE_DURATION", default_value_t = DEFAULT_DRIVE_SECS)]
    pub drive_duration: f64,

    /// Default hold for LEFT/RIGHT, seconds
    #[arg(long, env = "RIG_TURN_DURATION", default_value_t = DEFAULT_TURN_SECS)]
    pub turn_duration: f64,

    /// Longest hold a caller may request, seconds
    #[arg(long, env = "RIG_MAX_DURATION", default_value_t = DEFAULT_MAX_SECS)]
    pub max_duration: f64,

    /// GPIO backend
    #[arg(long, env = "RIG_GPIO_BACKEND", value_enum, default_value_t = Backend::Sim)]
    pub backend: Backend,

    /// Root of the sysfs GPIO tree
    #[arg(long, env = "RIG_SYSFS_ROOT", default_value = DEFAULT_SYSFS_ROOT)]
    pub sysfs_root: PathBuf,

    /// Sysfs number of the chip's first line (512 on Raspberry Pi with kernel 6.6+)
    #[arg(long, env = "RIG_SYSFS_BASE", default_value_t = 0)]
    pub sysfs_base: PinId,
}

impl Args {
    pub fn pins(&self) -> PinAssignment {
        PinAssignment::new(
            self.forward_pin,
            self.backward_pin,
            self.left_pin,
            self.right_pin,
        )
    }

    pub fn policy(&self) -> Result<DurationPolicy> {
        DurationPolicy::from_secs_f64(self.drive_duration, self.turn_duration, self.max_duration)
    }
}
