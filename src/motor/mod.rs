// Motor command core for the drive/turn rig
//
// Provides:
// - Command parsing and canonicalization
// - Pin map with the opposing-winding (shoot-through) policy
// - Duration defaults and validation
// - Serialized controller with timed auto-stop and a terminal shut-down state

pub mod command;
mod controller;
pub mod duration;
pub mod error;
pub mod pins;

pub use command::{Axis, Command};
pub use controller::{ControllerState, DriveResult, MotorController};
pub use duration::DurationPolicy;
pub use error::{DriveError, ErrorKind};
pub use pins::PinAssignment;
