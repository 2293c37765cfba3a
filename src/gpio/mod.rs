// GPIO capability consumed by the motor controller
//
// The controller never talks to hardware directly. It is handed a backend
// implementing `GpioBackend` and only calls into it while holding its lock.

pub mod sim;
pub mod sysfs;

pub use sim::{PinEvent, SimulatedGpio};
pub use sysfs::SysfsGpio;

/// Opaque line identifier, meaningful only to the backend (e.g. a BCM number)
pub type PinId = u32;

/// Logical output level
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low = 0,
    High = 1,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

/// Pin numbering scheme requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    /// Broadcom SoC channel numbers
    #[default]
    Bcm,
}

/// Error types for GPIO backends
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("IO error on pin {pin}: {source}")]
    Io {
        pin: PinId,
        #[source]
        source: std::io::Error,
    },

    #[error("Pin {pin} is not configured as an output")]
    NotConfigured { pin: PinId },

    #[error("Backend refused write to pin {pin}: {reason}")]
    Refused { pin: PinId, reason: String },
}

pub type Result<T> = std::result::Result<T, GpioError>;

/// Minimal digital-output capability
///
/// `set_warnings`, `set_numbering` and `teardown` are optional for a backend;
/// the defaults do nothing.
pub trait GpioBackend: Send {
    /// Enable or disable the backend's own pin-conflict warnings
    fn set_warnings(&mut self, _enabled: bool) {}

    /// Select the pin numbering mode
    fn set_numbering(&mut self, _mode: Numbering) {}

    /// Prepare a line for output, leaving it logically LOW
    fn configure_output(&mut self, pin: PinId) -> Result<()>;

    /// Drive a configured line
    fn write(&mut self, pin: PinId, level: Level) -> Result<()>;

    /// Release backend resources
    fn teardown(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<B: GpioBackend + ?Sized> GpioBackend for Box<B> {
    fn set_warnings(&mut self, enabled: bool) {
        (**self).set_warnings(enabled)
    }

    fn set_numbering(&mut self, mode: Numbering) {
        (**self).set_numbering(mode)
    }

    fn configure_output(&mut self, pin: PinId) -> Result<()> {
        (**self).configure_output(pin)
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<()> {
        (**self).write(pin, level)
    }

    fn teardown(&mut self) -> Result<()> {
        (**self).teardown()
    }
}
