mod download;
mod request;
mod settings;

use strand_context::{Canceller, Context, JoinHandle};
use trace_err::*;
use tracing::{debug, info, warn};

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        async fn terminate() {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .trace_expect("Failed to register signal handlers")
                .recv()
                .await;
        }
    } else {
        async fn terminate() {
            std::future::pending::<()>().await
        }
    }
}

fn listen_for_cancel(ctx: Context, cancel: Canceller) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = terminate() => {
                // Signal stop
                info!("Received terminate signal, stopping...");
                cancel.cancel();
            }
            _ = tokio::signal::ctrl_c() => {
                // Signal stop
                info!("Received CTRL+C, stopping...");
                cancel.cancel();
            }
            _ = ctx.done() => {}
        }
    })
}

async fn run(root: &Context, config: &settings::Config) -> anyhow::Result<()> {
    use settings::Mode;

    if matches!(config.mode, Mode::Cancel | Mode::All) {
        download::cancel(root, config).await?;
    }
    if matches!(config.mode, Mode::Timeout | Mode::All) {
        download::timeout(root, config).await?;
    }
    if matches!(config.mode, Mode::Value | Mode::All) {
        request::run(root, config);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Parse command line
    let Some(config) = settings::init() else {
        return;
    };

    // Prepare for graceful shutdown
    let (root, cancel) = Context::background().with_cancel();
    let listener = listen_for_cancel(root.clone(), cancel.clone());

    info!(mode = ?config.mode, "Started successfully");

    let result = run(&root, &config)
        .await
        .trace_err("Demonstration failed");

    // Release the signal listener
    cancel.cancel();
    listener.await.trace_expect("Signal listener terminated unexpectedly");

    info!("Stopped");

    if result.is_err() {
        std::process::exit(1);
    }
}
