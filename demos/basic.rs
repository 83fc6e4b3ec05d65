//! Basic structured logging example.
//!
//! Run with `PRETTY_LOGGER=true` for human-readable output.

use std::time::Duration;

use ctxlog::{Context, Fault};

fn main() {
    ctxlog::info()
        .str("component", "example")
        .i32("workers", 4)
        .dur("startup", Duration::from_millis(37))
        .msg("service started");

    let ctx = Context::background()
        .with_trace_id("4bf92f3577b34da6")
        .with_field("request_id", "req-1");
    let log = ctxlog::with_context(ctx, "orders");

    log.debug().strs("items", &["book", "pen"]).msg("order received");

    let err = Fault::new("payment declined")
        .with_type("PaymentError")
        .with_context("order_id", 1042);
    log.error().err(Some(&err)).msgf(format_args!("order {} failed", 1042));
}
