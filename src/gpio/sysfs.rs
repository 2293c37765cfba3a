// Linux sysfs GPIO backend (/sys/class/gpio)
//
// Line layout under the root:
//   export, unexport       write a line number to (un)claim it
//   gpioN/direction        "low" = output, initially LOW
//   gpioN/value            "1" / "0"
//
// Sysfs line numbers are global, not BCM numbers. Kernels 6.6 and later
// register the Raspberry Pi header chip at base 512, so BCM 17 is gpio529
// there; set the base with `with_base`. Older kernels use base 0.
//
// After `export`, udev fixes up ownership of the new gpioN node a moment
// later. Until then a non-root process sees ENOENT or EACCES, so the first
// `direction` write is retried with a growing backoff.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{GpioBackend, GpioError, Level, PinId, Result};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// Attempts for the first `direction` write after export
pub const DIRECTION_ATTEMPTS: u32 = 5;
/// Backoff step between attempts (grows linearly)
pub const DIRECTION_BACKOFF: Duration = Duration::from_millis(50);

pub struct SysfsGpio {
    root: PathBuf,
    /// Added to every pin to get the sysfs line number
    base: PinId,
    attempts: u32,
    backoff: Duration,
    /// Lines this backend exported itself (unexported again on teardown)
    exported: Vec<PinId>,
    configured: Vec<PinId>,
}

impl SysfsGpio {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base: 0,
            attempts: DIRECTION_ATTEMPTS,
            backoff: DIRECTION_BACKOFF,
            exported: Vec::new(),
            configured: Vec::new(),
        }
    }

    /// Offset of the GPIO chip in the global sysfs numbering
    pub fn with_base(mut self, base: PinId) -> Self {
        self.base = base;
        self
    }

    /// How often, and how patiently, to retry the post-export `direction` write
    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.backoff = backoff;
        self
    }

    fn line(&self, pin: PinId) -> PinId {
        self.base.saturating_add(pin)
    }

    fn line_dir(&self, pin: PinId) -> PathBuf {
        self.root.join(format!("gpio{}", self.line(pin)))
    }

    fn write_attr(&self, pin: PinId, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).map_err(|source| GpioError::Io { pin, source })
    }

    /// Write `direction`, waiting out udev while the node is not ready yet
    fn set_direction_low(&self, pin: PinId, path: &Path) -> Result<()> {
        let mut attempt = 1;
        loop {
            match fs::write(path, "low") {
                Ok(()) => return Ok(()),
                Err(e)
                    if attempt < self.attempts
                        && matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) =>
                {
                    debug!(
                        "GPIO line {} not ready ({}), retry {}/{}",
                        self.line(pin),
                        e,
                        attempt,
                        self.attempts - 1
                    );
                    thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
                Err(source) => return Err(GpioError::Io { pin, source }),
            }
        }
    }
}

impl GpioBackend for SysfsGpio {
    fn configure_output(&mut self, pin: PinId) -> Result<()> {
        let dir = self.line_dir(pin);
        if !dir.exists() {
            let line = self.line(pin);
            info!("Exporting GPIO line {} (pin {})", line, pin);
            self.write_attr(pin, &self.root.join("export"), &line.to_string())?;
            self.exported.push(pin);
        }

        // "low" configures the direction and the initial level in one write
        self.set_direction_low(pin, &dir.join("direction"))?;
        if !self.configured.contains(&pin) {
            self.configured.push(pin);
        }
        Ok(())
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<()> {
        if !self.configured.contains(&pin) {
            return Err(GpioError::NotConfigured { pin });
        }
        debug!("sysfs gpio: pin {} -> {:?}", pin, level);
        let value = match level {
            Level::High => "1",
            Level::Low => "0",
        };
        self.write_attr(pin, &self.line_dir(pin).join("value"), value)
    }

    fn teardown(&mut self) -> Result<()> {
        let unexport = self.root.join("unexport");
        let mut first_error = None;
        for pin in std::mem::take(&mut self.exported) {
            let line = self.line(pin);
            if let Err(source) = fs::write(&unexport, line.to_string()) {
                warn!("Failed to unexport GPIO line {}: {}", line, source);
                first_error.get_or_insert(GpioError::Io { pin, source });
            }
        }
        self.configured.clear();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
