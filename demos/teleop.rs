// Keyboard teleop: W/S forward/backward, A/D left/right, space stop, Q quit
//
// Each key press issues one drive query and waits for its reply, so the rig
// finishes a hold before the next key is sent.
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tracing::{info, warn};

use drive_rig_runtime::config::KEY_CMD_DRIVE;
use drive_rig_runtime::messages::{DriveRequest, DriveResponse};

// Longest hold plus a queue of a few commands ahead of us
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Optional explicit hold in seconds for every command
    let duration = match std::env::args().nth(1) {
        Some(arg) => Some(arg.parse::<f64>()?),
        None => None,
    };

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Controls: W/S=drive, A/D=turn, SPACE=stop, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&session, duration).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    session: &zenoh::Session,
    duration: Option<f64>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        let cmd = match code {
            KeyCode::Char('w') => "forward",
            KeyCode::Char('s') => "backward",
            KeyCode::Char('a') => "left",
            KeyCode::Char('d') => "right",
            KeyCode::Char(' ') => "stop",
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => continue,
        };

        send_command(session, cmd, duration).await?;
    }

    Ok(())
}

async fn send_command(
    session: &zenoh::Session,
    cmd: &str,
    duration: Option<f64>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let request = serde_json::to_string(&DriveRequest::new(cmd, duration))?;
    let replies = session
        .get(KEY_CMD_DRIVE)
        .payload(request)
        .timeout(QUERY_TIMEOUT)
        .await?;

    while let Ok(reply) = replies.recv_async().await {
        match reply.result() {
            Ok(sample) => {
                let payload = sample.payload().to_bytes();
                match serde_json::from_slice::<DriveResponse>(&payload) {
                    Ok(DriveResponse::Ok {
                        message, duration, ..
                    }) => info!("{} ({}s)", message, duration),
                    Ok(DriveResponse::Error { code, message, .. }) => {
                        warn!("Rejected [{}]: {}", code, message)
                    }
                    Err(e) => warn!("Unreadable reply: {}", e),
                }
            }
            Err(err) => warn!("Error reply: {:?}", err),
        }
    }

    Ok(())
}
