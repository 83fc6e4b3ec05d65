//! Fatal events drive cooperative shutdown of an async application.

use std::sync::Arc;
use std::time::Duration;

use ctxlog::testing::CaptureWriter;
use ctxlog::{Context, Value};
use tokio::sync::watch;

#[tokio::test]
async fn test_fatal_requests_graceful_shutdown() {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let capture = CaptureWriter::new();
    let registry = Arc::new(
        ctxlog::builder()
            .with_writer(Arc::clone(&capture))
            .with_cancel_func(move || {
                let _ = shutdown_tx.send(true);
            })
            .build(),
    );

    let worker = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let ctx = Context::background().with_trace_id("job-1");
            let log = registry.with_context(ctx, "worker");
            tokio::time::sleep(Duration::from_millis(10)).await;
            log.fatal().str("reason", "poisoned queue").msg("cannot continue");
        })
    };

    tokio::time::timeout(Duration::from_secs(5), shutdown_rx.changed())
        .await
        .expect("shutdown requested in time")
        .expect("sender alive");
    assert!(*shutdown_rx.borrow());
    worker.await.expect("worker finished");

    let record = capture.last().expect("fatal record written");
    assert_eq!(record.get("fatal"), Some(&Value::Bool(true)));
    assert_eq!(record.get("trace_id"), Some(&Value::from("job-1")));
    assert_eq!(record.message(), Some("cannot continue"));
}

#[tokio::test]
async fn test_cancel_func_tolerates_repeated_fatal() {
    let (shutdown_tx, shutdown_rx) = watch::channel(0u32);
    let registry = ctxlog::builder()
        .with_writer(CaptureWriter::new())
        .with_cancel_func(move || {
            shutdown_tx.send_modify(|n| *n += 1);
        })
        .build();

    for i in 0..5 {
        registry.fatal().i32("attempt", i).send();
    }

    assert_eq!(*shutdown_rx.borrow(), 5);
}
