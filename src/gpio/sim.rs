// In-memory GPIO backend
//
// Keeps line levels and a timestamped write log. Clones share the same
// state, so a test (or the runtime's dry-run mode) can keep a handle while the
// controller owns the backend.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

use super::{GpioBackend, GpioError, Level, Numbering, PinId, Result};

/// One recorded write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub pin: PinId,
    pub level: Level,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct SimState {
    warnings_enabled: Option<bool>,
    numbering: Option<Numbering>,
    configured: BTreeSet<PinId>,
    levels: HashMap<PinId, Level>,
    events: Vec<PinEvent>,
    refuse_high: HashSet<PinId>,
    torn_down: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedGpio {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // A panic while holding this lock leaves plain data behind, still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every HIGH write to `pin` fail (fault injection)
    pub fn refuse_high(&self, pin: PinId) {
        self.state().refuse_high.insert(pin);
    }

    /// Current level of a line; lines never written read LOW
    pub fn level(&self, pin: PinId) -> Level {
        self.state().levels.get(&pin).copied().unwrap_or(Level::Low)
    }

    /// Lines currently driven HIGH
    pub fn high_pins(&self) -> Vec<PinId> {
        let state = self.state();
        let mut pins: Vec<PinId> = state
            .levels
            .iter()
            .filter(|(_, level)| level.is_high())
            .map(|(&pin, _)| pin)
            .collect();
        pins.sort_unstable();
        pins
    }

    pub fn events(&self) -> Vec<PinEvent> {
        self.state().events.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state().events.len()
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    pub fn is_configured(&self, pin: PinId) -> bool {
        self.state().configured.contains(&pin)
    }

    pub fn warnings_enabled(&self) -> Option<bool> {
        self.state().warnings_enabled
    }

    pub fn numbering(&self) -> Option<Numbering> {
        self.state().numbering
    }

    pub fn is_torn_down(&self) -> bool {
        self.state().torn_down
    }
}

impl GpioBackend for SimulatedGpio {
    fn set_warnings(&mut self, enabled: bool) {
        self.state().warnings_enabled = Some(enabled);
    }

    fn set_numbering(&mut self, mode: Numbering) {
        self.state().numbering = Some(mode);
    }

    fn configure_output(&mut self, pin: PinId) -> Result<()> {
        let mut state = self.state();
        state.configured.insert(pin);
        state.levels.insert(pin, Level::Low);
        state.torn_down = false;
        Ok(())
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<()> {
        let mut state = self.state();
        if !state.configured.contains(&pin) {
            return Err(GpioError::NotConfigured { pin });
        }
        if level.is_high() && state.refuse_high.contains(&pin) {
            return Err(GpioError::Refused {
                pin,
                reason: "fault injected".to_string(),
            });
        }

        debug!("sim gpio: pin {} -> {:?}", pin, level);
        state.levels.insert(pin, level);
        state.events.push(PinEvent {
            pin,
            level,
            at: Instant::now(),
        });
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        let mut state = self.state();
        state.configured.clear();
        state.torn_down = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_configured_pin() {
        let mut gpio = SimulatedGpio::new();
        assert!(matches!(
            gpio.write(4, Level::High),
            Err(GpioError::NotConfigured { pin: 4 })
        ));

        gpio.configure_output(4).unwrap();
        gpio.write(4, Level::High).unwrap();
        assert_eq!(gpio.level(4), Level::High);
        assert_eq!(gpio.high_pins(), vec![4]);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = SimulatedGpio::new();
        let mut owned = handle.clone();
        owned.configure_output(9).unwrap();
        owned.write(9, Level::High).unwrap();
        owned.write(9, Level::Low).unwrap();

        assert_eq!(handle.write_count(), 2);
        assert_eq!(handle.level(9), Level::Low);
    }

    #[test]
    fn test_refused_high_leaves_level_untouched() {
        let mut gpio = SimulatedGpio::new();
        gpio.configure_output(3).unwrap();
        gpio.refuse_high(3);

        assert!(gpio.write(3, Level::High).is_err());
        gpio.write(3, Level::Low).unwrap();
        assert_eq!(gpio.level(3), Level::Low);
        assert_eq!(gpio.write_count(), 1);
    }

    #[test]
    fn test_teardown_unconfigures_lines() {
        let mut gpio = SimulatedGpio::new();
        gpio.configure_output(1).unwrap();
        gpio.teardown().unwrap();

        assert!(gpio.is_torn_down());
        assert!(!gpio.is_configured(1));
    }
}
