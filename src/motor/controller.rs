// Serialized motor command execution
//
// One async mutex guards every pin write. A motion command holds the lock for
// its whole actuate -> hold -> reset sequence, so a second command (STOP
// included) queues behind it and can never energize a conflicting pair.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::command::Command;
use super::duration::DurationPolicy;
use super::error::{DriveError, Result};
use super::pins::PinAssignment;
use crate::gpio::{GpioBackend, Level, Numbering, PinId};

/// Controller lifecycle; `ShutDown` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Active,
    ShutDown,
}

/// Outcome of an accepted command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveResult {
    pub command: Command,
    /// Seconds the command was held (0 for STOP)
    pub duration: f64,
}

impl DriveResult {
    pub fn stopped() -> Self {
        Self {
            command: Command::Stop,
            duration: 0.0,
        }
    }

    pub fn message(&self) -> String {
        let name = self.command.as_str().to_ascii_lowercase();
        match self.command {
            Command::Forward | Command::Backward => format!("Moving {}", name),
            Command::Left | Command::Right => format!("Turning {}", name),
            Command::Stop => "Motors stopped".to_string(),
        }
    }
}

struct Inner {
    gpio: Box<dyn GpioBackend>,
    state: ControllerState,
}

impl Inner {
    fn ensure_active(&self) -> Result<()> {
        match self.state {
            ControllerState::Active => Ok(()),
            ControllerState::ShutDown => Err(DriveError::ShutDown),
        }
    }

    /// Drive every line LOW, attempting all of them even if one write fails
    fn all_low(&mut self, pins: &[PinId; 4]) -> Result<()> {
        let mut first_error = None;
        for &pin in pins {
            if let Err(e) = self.gpio.write(pin, Level::Low) {
                warn!("Failed to drive pin {} LOW: {}", pin, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Lines energized for a hold
///
/// Dropping this without `release` (a failed write, or the caller's future
/// being cancelled mid-hold) still drives every line LOW.
struct Energized<'a> {
    inner: &'a mut Inner,
    pins: [PinId; 4],
    released: bool,
}

impl<'a> Energized<'a> {
    fn engage(inner: &'a mut Inner, pins: [PinId; 4], active: PinId, inactive: PinId) -> Result<Self> {
        let guard = Self {
            inner,
            pins,
            released: false,
        };
        // Opposing line goes LOW before the active line goes HIGH
        guard.inner.gpio.write(inactive, Level::Low)?;
        guard.inner.gpio.write(active, Level::High)?;
        Ok(guard)
    }

    fn release(mut self) -> Result<()> {
        self.released = true;
        self.inner.all_low(&self.pins)
    }
}

impl Drop for Energized<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("Hold interrupted, forcing all lines LOW");
        if let Err(e) = self.inner.all_low(&self.pins) {
            warn!("Reset after interrupted hold failed: {}", e);
        }
    }
}

/// Serialized controller for the four-line drive/turn rig
pub struct MotorController {
    inner: Mutex<Inner>,
    pins: PinAssignment,
    policy: DurationPolicy,
}

impl MotorController {
    /// Create a controller with the default duration policy
    pub fn new(gpio: impl GpioBackend + 'static, pins: PinAssignment) -> Result<Self> {
        Self::with_policy(gpio, pins, DurationPolicy::default())
    }

    /// Create with a custom duration policy
    ///
    /// Configures every line as an output driven LOW before the controller
    /// becomes usable. Any failure here means no controller is created.
    pub fn with_policy(
        gpio: impl GpioBackend + 'static,
        pins: PinAssignment,
        policy: DurationPolicy,
    ) -> Result<Self> {
        policy.validate()?;
        if !pins.is_distinct() {
            return Err(DriveError::Configuration(format!(
                "pin assignment reuses a line: {:?}",
                pins
            )));
        }

        let mut gpio: Box<dyn GpioBackend> = Box::new(gpio);
        info!("Initializing GPIO lines {:?}", pins.all());

        gpio.set_warnings(false);
        gpio.set_numbering(Numbering::Bcm);
        let init = pins.all().into_iter().try_for_each(|pin| {
            gpio.configure_output(pin)?;
            gpio.write(pin, Level::Low)
        });
        if let Err(e) = init {
            if let Err(teardown) = gpio.teardown() {
                warn!("Teardown after failed initialization also failed: {}", teardown);
            }
            return Err(DriveError::Configuration(format!(
                "GPIO initialization failed: {}",
                e
            )));
        }

        info!(
            "Motor controller ready (drive {:?}, turn {:?}, max {:?})",
            policy.drive, policy.turn, policy.max
        );
        Ok(Self {
            inner: Mutex::new(Inner {
                gpio,
                state: ControllerState::Active,
            }),
            pins,
            policy,
        })
    }

    pub fn pins(&self) -> PinAssignment {
        self.pins
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    /// Parse and run a textual command
    ///
    /// `command` is matched case-insensitively; `duration` is in seconds and
    /// falls back to the policy default for the command's axis.
    pub async fn execute(&self, command: &str, duration: Option<f64>) -> Result<DriveResult> {
        let command: Command = command.parse()?;
        self.run(command, duration).await
    }

    /// Run an already-parsed command
    pub async fn run(&self, command: Command, duration: Option<f64>) -> Result<DriveResult> {
        let Some((active, inactive)) = self.pins.pins_for(command) else {
            return self.stop().await;
        };
        let seconds = self.policy.resolve(command, duration)?;
        let hold = Duration::from_secs_f64(seconds);

        let mut inner = self.inner.lock().await;
        inner.ensure_active()?;

        info!(
            "{} for {}s (pin {} HIGH, pin {} LOW)",
            command, seconds, active, inactive
        );
        let energized = Energized::engage(&mut inner, self.pins.all(), active, inactive)?;
        tokio::time::sleep(hold).await;
        energized.release()?;
        debug!("{} complete", command);

        Ok(DriveResult {
            command,
            duration: seconds,
        })
    }

    /// Drive every line LOW
    ///
    /// Waits for any in-flight hold to finish first; it does not interrupt it.
    pub async fn stop(&self) -> Result<DriveResult> {
        let mut inner = self.inner.lock().await;
        inner.ensure_active()?;

        info!("Stopping all motors");
        inner.all_low(&self.pins.all())?;
        Ok(DriveResult::stopped())
    }

    /// Force all lines LOW, tear the backend down and refuse further commands
    ///
    /// Only the first call touches hardware; later calls return `Ok(())`.
    pub async fn cleanup(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state == ControllerState::ShutDown {
            debug!("Cleanup already done");
            return Ok(());
        }

        info!("Shutting down motor controller");
        let reset = inner.all_low(&self.pins.all());
        let teardown = inner.gpio.teardown();
        inner.state = ControllerState::ShutDown;

        reset?;
        teardown?;
        Ok(())
    }
}

impl Drop for MotorController {
    fn drop(&mut self) {
        // Stop motors when the controller goes away without cleanup
        let pins = self.pins.all();
        let inner = self.inner.get_mut();
        if inner.state == ControllerState::ShutDown {
            return;
        }
        warn!("Motor controller dropped while active, de-energizing");
        if let Err(e) = inner.all_low(&pins) {
            warn!("Failed to stop motors on drop: {}", e);
        }
        if let Err(e) = inner.gpio.teardown() {
            warn!("Failed to release GPIO on drop: {}", e);
        }
        inner.state = ControllerState::ShutDown;
    }
}
