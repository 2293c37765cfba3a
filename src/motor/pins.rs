// Pin map and shoot-through policy
//
// Each axis is a pair of opposing windings. Energizing a direction means
// driving its line HIGH while forcing the opposing line LOW.

use serde::{Deserialize, Serialize};

use super::command::Command;
use crate::gpio::PinId;

/// Default BCM lines for the rig
pub const DEFAULT_FORWARD_PIN: PinId = 17;
pub const DEFAULT_BACKWARD_PIN: PinId = 27;
pub const DEFAULT_LEFT_PIN: PinId = 22;
pub const DEFAULT_RIGHT_PIN: PinId = 23;

/// The four output lines driving the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinAssignment {
    pub forward: PinId,
    pub backward: PinId,
    pub left: PinId,
    pub right: PinId,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            forward: DEFAULT_FORWARD_PIN,
            backward: DEFAULT_BACKWARD_PIN,
            left: DEFAULT_LEFT_PIN,
            right: DEFAULT_RIGHT_PIN,
        }
    }
}

impl PinAssignment {
    pub fn new(forward: PinId, backward: PinId, left: PinId, right: PinId) -> Self {
        Self {
            forward,
            backward,
            left,
            right,
        }
    }

    /// Returns pins as array [forward, backward, left, right]
    pub fn all(&self) -> [PinId; 4] {
        [self.forward, self.backward, self.left, self.right]
    }

    /// True when no line is shared between two roles
    pub fn is_distinct(&self) -> bool {
        let pins = self.all();
        pins.iter()
            .enumerate()
            .all(|(i, pin)| !pins[i + 1..].contains(pin))
    }

    /// `(active, inactive)` lines for a motion command
    ///
    /// STOP has no pair: it drives every line LOW instead.
    pub fn pins_for(&self, command: Command) -> Option<(PinId, PinId)> {
        match command {
            Command::Forward => Some((self.forward, self.backward)),
            Command::Backward => Some((self.backward, self.forward)),
            Command::Left => Some((self.left, self.right)),
            Command::Right => Some((self.right, self.left)),
            Command::Stop => None,
        }
    }
}
