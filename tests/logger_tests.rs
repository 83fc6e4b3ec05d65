use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ctxlog::testing::CaptureWriter;
use ctxlog::{Context, Level, Registry, Value};

fn registry() -> (Registry, Arc<CaptureWriter>) {
    let capture = CaptureWriter::new();
    let registry = ctxlog::builder()
        .with_writer(Arc::clone(&capture))
        .with_timestamp(false)
        .build();
    (registry, capture)
}

#[test]
fn test_namespace_logger_levels() {
    let (registry, capture) = registry();
    let log = registry.namespace("payments");

    log.debug().msg("d");
    log.info().msg("i");
    log.warn().msg("w");
    log.error().msg("e");

    let records = capture.records();
    let levels: Vec<Level> = records.iter().map(|r| r.level()).collect();
    assert_eq!(
        levels,
        vec![Level::Debug, Level::Info, Level::Warn, Level::Error]
    );
    for record in &records {
        assert_eq!(record.get("namespace"), Some(&Value::from("payments")));
        assert!(record.get("trace_id").is_none());
    }
}

#[test]
fn test_context_logger_binds_context_before_namespace() {
    let (registry, capture) = registry();
    let ctx = Context::background()
        .with_trace_id("abc")
        .with_field("request_id", "req-7");
    let log = registry.with_context(ctx, "api");

    log.info().str("route", "/health").msg("served");

    let record = capture.last().unwrap();
    assert_eq!(
        record.fields().keys().collect::<Vec<_>>(),
        vec!["request_id", "trace_id", "namespace", "route"]
    );
    assert_eq!(record.get("trace_id"), Some(&Value::from("abc")));
    assert_eq!(record.message(), Some("served"));
}

#[test]
fn test_empty_namespace_adds_no_field() {
    let (registry, capture) = registry();
    registry.namespace("").info().send();
    assert!(capture.last().unwrap().get("namespace").is_none());
}

#[test]
fn test_each_call_is_a_fresh_event() {
    let (registry, capture) = registry();
    let log = registry.namespace("jobs");

    log.info().str("first", "1").send();
    log.info().send();

    let records = capture.records();
    assert_eq!(records.len(), 2);
    assert!(records[1].get("first").is_none());
    assert_eq!(records[1].fields().len(), 1);
}

#[test]
fn test_logger_runs_extractor() {
    let capture = CaptureWriter::new();
    let registry = ctxlog::builder()
        .with_writer(Arc::clone(&capture))
        .with_extractor(|_, fields| fields.push("host", "node-1"))
        .build();

    registry.namespace("svc").warn().send();

    let record = capture.last().unwrap();
    assert_eq!(record.get("host"), Some(&Value::from("node-1")));
    assert_eq!(record.get("namespace"), Some(&Value::from("svc")));
}

#[test]
fn test_logger_fatal_cancels() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let (registry, capture) = registry();
    registry.set_cancel_func(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let log = registry.namespace("worker");

    for _ in 0..3 {
        log.fatal().msg("giving up");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let record = capture.last().unwrap();
    assert_eq!(record.level(), Level::Error);
    assert_eq!(record.get("fatal"), Some(&Value::Bool(true)));
    assert_eq!(record.get("namespace"), Some(&Value::from("worker")));
}

#[test]
fn test_logger_accessors_and_clone() {
    let (registry, _capture) = registry();
    let ctx = Context::background().with_trace_id("t");
    let log = registry.with_context(ctx, "ns");
    let copy = log.clone();

    assert_eq!(copy.namespace(), "ns");
    assert_eq!(copy.context().trace_id(), Some("t"));
}
