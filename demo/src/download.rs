use super::*;
use strand_context::{Error, Report, TaskPool, Worker};

fn download_step(step: u64) {
    info!(step, "Downloading...");
}

fn spawn_download(pool: &TaskPool, ctx: Context, interval: time::Duration) -> JoinHandle<Report> {
    strand_context::spawn!(pool, "download", async move {
        Worker::new(download_step)
            .with_interval(interval)
            .run(&ctx)
            .await
    })
}

/// Starts a download and cancels it explicitly after `cancel_after`.
///
/// If `parent` fires first, the download stops with the parent's reason.
pub async fn cancel(parent: &Context, config: &settings::Config) -> anyhow::Result<Report> {
    let pool = TaskPool::new(parent);
    let (ctx, cancel) = pool.child();
    let worker = spawn_download(&pool, ctx, config.interval);

    tokio::select! {
        _ = tokio::time::sleep(config.cancel_after.unsigned_abs()) => {
            info!("Cancelling download");
            cancel.cancel();
        }
        reason = parent.cancelled() => {
            warn!(%reason, "Interrupted before cancelling");
        }
    }

    let report = worker.await?;
    info!(%report, "Download cancelled");

    pool.shutdown().await;
    Ok(report)
}

/// Starts a download under a `timeout` deadline and waits for it to end.
///
/// Returns the reason the deadline context fired along with the worker's
/// own report.
pub async fn timeout(
    parent: &Context,
    config: &settings::Config,
) -> anyhow::Result<(Error, Report)> {
    let (ctx, cancel) = parent.with_timeout(config.timeout);
    let _guard = cancel.drop_guard();

    let pool = TaskPool::new(&ctx);
    let worker = spawn_download(&pool, pool.context().clone(), config.interval);

    let reason = ctx.cancelled().await;
    info!(%reason, "Download ended");

    let report = worker.await?;
    debug!(%report, "Download worker finished");

    pool.shutdown().await;
    Ok((reason, report))
}
