// Drive commands accepted by the rig

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DriveError;

/// Axis a command moves along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Forward/backward winding pair
    Drive,
    /// Left/right winding pair
    Turn,
}

/// Canonical drive command
///
/// Parsed case-insensitively from text (surrounding whitespace ignored);
/// serialized in uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Forward,
        Command::Backward,
        Command::Left,
        Command::Right,
        Command::Stop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Forward => "FORWARD",
            Command::Backward => "BACKWARD",
            Command::Left => "LEFT",
            Command::Right => "RIGHT",
            Command::Stop => "STOP",
        }
    }

    /// Axis this command energizes; STOP touches none
    pub fn axis(self) -> Option<Axis> {
        match self {
            Command::Forward | Command::Backward => Some(Axis::Drive),
            Command::Left | Command::Right => Some(Axis::Turn),
            Command::Stop => None,
        }
    }

    /// The command that energizes the opposing winding on the same axis
    pub fn opposite(self) -> Option<Command> {
        match self {
            Command::Forward => Some(Command::Backward),
            Command::Backward => Some(Command::Forward),
            Command::Left => Some(Command::Right),
            Command::Right => Some(Command::Left),
            Command::Stop => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(DriveError::InvalidCommand("Command is required".to_string()));
        }

        Command::ALL
            .into_iter()
            .find(|cmd| cmd.as_str() == normalized)
            .ok_or_else(|| DriveError::InvalidCommand(format!("Unknown command: {}", s.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_trimmed() {
        assert_eq!("forward".parse::<Command>().unwrap(), Command::Forward);
        assert_eq!("  Backward\n".parse::<Command>().unwrap(), Command::Backward);
        assert_eq!("LeFt".parse::<Command>().unwrap(), Command::Left);
        assert_eq!("RIGHT".parse::<Command>().unwrap(), Command::Right);
        assert_eq!(" stop ".parse::<Command>().unwrap(), Command::Stop);
    }

    #[test]
    fn test_parse_rejects_unknown_and_empty() {
        for input in ["spin", "", "   ", "forwards", "STOP!"] {
            let err = input.parse::<Command>().unwrap_err();
            assert!(
                matches!(err, DriveError::InvalidCommand(_)),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_opposites_share_axis() {
        for cmd in Command::ALL {
            match cmd.opposite() {
                Some(opposite) => {
                    assert_ne!(opposite, cmd);
                    assert_eq!(opposite.axis(), cmd.axis());
                    assert_eq!(opposite.opposite(), Some(cmd));
                }
                None => assert_eq!(cmd, Command::Stop),
            }
        }
    }

    #[test]
    fn test_serializes_uppercase() {
        let json = serde_json::to_string(&Command::Left).unwrap();
        assert_eq!(json, "\"LEFT\"");
        assert_eq!(Command::Right.to_string(), "RIGHT");
    }
}
