// Message types exchanged with remote callers

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::motor::{Command, ControllerState, DriveError, DriveResult, ErrorKind};

// Request from teleop/scripts -> runtime
// `duration` stays loosely typed here: numeric strings are accepted, anything
// else is reported as an invalid duration rather than a malformed request.
// The exception is a number literal outside f64 range (e.g. 1e400): the JSON
// decoder rejects the whole body, so it comes back as a malformed request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveRequest {
    #[serde(default)]
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
}

impl DriveRequest {
    pub fn new(cmd: impl Into<String>, duration: Option<f64>) -> Self {
        Self {
            cmd: cmd.into(),
            duration: duration.map(Value::from),
        }
    }

    /// Requested duration in seconds, if any
    pub fn duration_secs(&self) -> Result<Option<f64>, DriveError> {
        let not_a_number = || DriveError::InvalidDuration("Duration must be a number".to_string());
        match &self.duration {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(not_a_number),
            Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| not_a_number()),
            Some(_) => Err(not_a_number()),
        }
    }
}

/// Reply envelope, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriveResponse {
    Ok {
        command: Command,
        duration: f64,
        message: String,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<ErrorKind>,
        code: u16,
        message: String,
    },
}

impl DriveResponse {
    /// Error for a payload that is not a JSON request object
    pub fn malformed() -> Self {
        DriveResponse::Error {
            kind: None,
            code: 400,
            message: "JSON payload required".to_string(),
        }
    }

    /// HTTP-style status code
    pub fn code(&self) -> u16 {
        match self {
            DriveResponse::Ok { .. } => 200,
            DriveResponse::Error { code, .. } => *code,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, DriveResponse::Ok { .. })
    }
}

impl From<&DriveResult> for DriveResponse {
    fn from(result: &DriveResult) -> Self {
        DriveResponse::Ok {
            command: result.command,
            duration: result.duration,
            message: result.message(),
        }
    }
}

impl From<&DriveError> for DriveResponse {
    fn from(err: &DriveError) -> Self {
        DriveResponse::Error {
            kind: Some(err.kind()),
            code: err.status_code(),
            message: err.to_string(),
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    ShutDown,
}

impl From<ControllerState> for RuntimeHealth {
    fn from(state: ControllerState) -> Self {
        match state {
            ControllerState::Active => RuntimeHealth::Ok,
            ControllerState::ShutDown => RuntimeHealth::ShutDown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> DriveRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_duration_forms() {
        assert_eq!(request(json!({"cmd": "forward"})).duration_secs().unwrap(), None);
        assert_eq!(
            request(json!({"cmd": "forward", "duration": null}))
                .duration_secs()
                .unwrap(),
            None
        );
        assert_eq!(
            request(json!({"cmd": "left", "duration": 0.5}))
                .duration_secs()
                .unwrap(),
            Some(0.5)
        );
        assert_eq!(
            request(json!({"cmd": "left", "duration": 3}))
                .duration_secs()
                .unwrap(),
            Some(3.0)
        );
        assert_eq!(
            request(json!({"cmd": "left", "duration": " 1.5 "}))
                .duration_secs()
                .unwrap(),
            Some(1.5)
        );
    }

    #[test]
    fn test_non_numeric_duration_rejected() {
        for duration in [json!("abc"), json!(true), json!([1]), json!({"s": 1})] {
            let err = request(json!({"cmd": "forward", "duration": duration}))
                .duration_secs()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDuration);
            assert_eq!(err.to_string(), "Duration must be a number");
        }
    }

    #[test]
    fn test_ok_envelope_shape() {
        let result = DriveResult {
            command: Command::Forward,
            duration: 2.0,
        };
        let value = serde_json::to_value(DriveResponse::from(&result)).unwrap();
        assert_eq!(
            value,
            json!({"status": "ok", "command": "FORWARD", "duration": 2.0, "message": "Moving forward"})
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = DriveResponse::from(&DriveError::ShutDown);
        assert_eq!(response.code(), 503);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"status": "error", "kind": "shut_down", "code": 503, "message": "Controller is shut down"})
        );

        let value = serde_json::to_value(DriveResponse::malformed()).unwrap();
        assert_eq!(
            value,
            json!({"status": "error", "code": 400, "message": "JSON payload required"})
        );
    }

    #[test]
    fn test_envelope_round_trips_for_clients() {
        let response = DriveResponse::from(&DriveResult::stopped());
        let json = serde_json::to_string(&response).unwrap();
        let parsed: DriveResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_health_from_controller_state() {
        assert_eq!(RuntimeHealth::from(ControllerState::Active), RuntimeHealth::Ok);
        assert_eq!(RuntimeHealth::from(ControllerState::ShutDown), RuntimeHealth::ShutDown);
        assert_eq!(serde_json::to_value(RuntimeHealth::ShutDown).unwrap(), json!("shut_down"));
    }
}
