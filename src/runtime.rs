// Drive service: zenoh queryable in front of the motor controller
//
// Each query runs on its own task, so concurrent callers queue on the
// controller's lock instead of on this loop. The loop itself only accepts
// queries, publishes health and watches for shutdown signals.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::{Args, Backend, KEY_CMD_DRIVE, KEY_HEALTH};
use crate::gpio::{GpioBackend, SimulatedGpio, SysfsGpio};
use crate::messages::{DriveRequest, DriveResponse, RuntimeHealth};
use crate::motor::{Command, DriveError, DriveResult, MotorController};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Decode a request payload, run it and build the reply envelope
pub async fn handle_payload(controller: &MotorController, payload: Option<&[u8]>) -> DriveResponse {
    let Some(payload) = payload else {
        return DriveResponse::malformed();
    };
    let request: DriveRequest = match serde_json::from_slice(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!("Failed to parse command: {}", e);
            return DriveResponse::malformed();
        }
    };

    info!("Received command: {:?}", &request);
    match drive(controller, &request).await {
        Ok(result) => DriveResponse::from(&result),
        Err(e) => {
            warn!("Command {:?} rejected: {}", request.cmd, e);
            DriveResponse::from(&e)
        }
    }
}

async fn drive(
    controller: &MotorController,
    request: &DriveRequest,
) -> Result<DriveResult, DriveError> {
    let command: Command = request.cmd.parse()?;
    if command == Command::Stop {
        // STOP ignores any duration, even a malformed one
        return controller.stop().await;
    }
    let duration = request.duration_secs()?;
    controller.run(command, duration).await
}

/// Health as the controller itself reports it
pub async fn health(controller: &MotorController) -> RuntimeHealth {
    controller.state().await.into()
}

fn build_backend(args: &Args) -> Box<dyn GpioBackend> {
    match args.backend {
        Backend::Sim => {
            info!("Using simulated GPIO (no hardware)");
            Box::new(SimulatedGpio::new())
        }
        Backend::Sysfs => {
            info!(
                "Using sysfs GPIO at {} (line base {})",
                args.sysfs_root.display(),
                args.sysfs_base
            );
            Box::new(SysfsGpio::with_root(&args.sysfs_root).with_base(args.sysfs_base))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

pub async fn run(args: Args) -> Result<(), BoxError> {
    let policy = args.policy()?;
    let controller = Arc::new(MotorController::with_policy(
        build_backend(&args),
        args.pins(),
        policy,
    )?);

    let served = serve(Arc::clone(&controller)).await;

    info!("Shutting down, de-energizing all lines...");
    let cleaned = controller.cleanup().await;
    finish(served, cleaned)
}

/// Combine the serve and cleanup outcomes; the serve error wins, a cleanup
/// failure behind it is only logged.
fn finish(served: Result<(), BoxError>, cleaned: Result<(), DriveError>) -> Result<(), BoxError> {
    match (served, cleaned) {
        (Err(e), Err(cleanup_err)) => {
            error!("Cleanup after failed serve also failed: {}", cleanup_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), cleaned) => cleaned.map_err(Into::into),
    }
}

async fn serve(controller: Arc<MotorController>) -> Result<(), BoxError> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up queryable and publishers...");
    let queryable = session.declare_queryable(KEY_CMD_DRIVE).await?;
    let pub_health = session.declare_publisher(KEY_HEALTH).await?;
    let (health_tx, mut health_rx) = mpsc::unbounded_channel::<RuntimeHealth>();

    let pins = controller.pins();
    let policy = controller.policy();
    info!(
        "Runtime started: pins {:?}, drive {:?}, turn {:?}, max {:?}",
        pins.all(),
        policy.drive,
        policy.turn,
        policy.max
    );
    info!("Serving drive queries on: {}", KEY_CMD_DRIVE);
    info!("Publishing to: {}", KEY_HEALTH);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            query = queryable.recv_async() => {
                let query = match query {
                    Ok(query) => query,
                    Err(e) => {
                        warn!("Queryable closed: {}", e);
                        break;
                    }
                };

                let controller = Arc::clone(&controller);
                let health_tx = health_tx.clone();
                tokio::spawn(async move {
                    let payload = query.payload().map(|p| p.to_bytes());
                    let response = handle_payload(&controller, payload.as_deref()).await;

                    match serde_json::to_string(&response) {
                        Ok(reply) => {
                            if let Err(e) = query.reply(query.key_expr().clone(), reply).await {
                                warn!("Failed to send reply: {}", e);
                            }
                        }
                        Err(e) => warn!("Failed to encode reply: {}", e),
                    }

                    let _ = health_tx.send(health(&controller).await);
                });
            }

            Some(health) = health_rx.recv() => {
                let health_json = serde_json::to_string(&health)?;
                pub_health.put(health_json).await?;
            }
        }
    }

    Ok(())
}
