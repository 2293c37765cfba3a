// Drive rig runtime: serialized, shoot-through-safe control of a four-line
// drive/turn motor rig, served over zenoh.

pub mod config;
pub mod gpio;
pub mod messages;
pub mod motor;
pub mod runtime;
