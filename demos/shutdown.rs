//! Fatal events request a graceful shutdown instead of exiting.

use std::time::Duration;

use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    ctxlog::builder()
        .with_pretty(true)
        .with_cancel_func(move || {
            let _ = shutdown_tx.send(true);
        })
        .install()?;

    let worker = tokio::spawn(async {
        let log = ctxlog::namespace("worker");
        for tick in 0.. {
            if tick == 3 {
                log.fatal().i32("tick", tick).msg("queue is poisoned");
                break;
            }
            log.info().i32("tick", tick).msg("working");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    shutdown_rx.changed().await?;
    ctxlog::info().msg("shutdown requested, draining");
    worker.await?;
    ctxlog::info().msg("bye");
    Ok(())
}
