//! # ctxlog
//!
//! A fluent structured-logging facade with context enrichment.
//!
//! ## Features
//!
//! - Chained, typed field setters finalized by `msg`/`msgf`/`send`
//! - Trace id and custom fields derived from a request [`Context`]
//! - Structured errors expanded into individual fields
//! - Namespaced loggers bound to a context
//! - A `fatal` level that requests cooperative shutdown instead of exiting
//! - JSON or human-readable output, or forwarding into `tracing`
//!
//! ## Example
//!
//! ```rust
//! use ctxlog::{Context, Fault};
//!
//! let ctx = Context::background().with_trace_id("4bf92f35");
//! let log = ctxlog::with_context(ctx, "billing");
//!
//! let err = Fault::new("card declined").with_type("PaymentError");
//! log.error().err(Some(&err)).i64("amount", 1200).msg("charge failed");
//! ```
//!
//! Configure the process-wide registry once at startup:
//!
//! ```rust,no_run
//! ctxlog::builder()
//!     .with_pretty(true)
//!     .with_cancel_func(|| println!("shutdown requested"))
//!     .install()?;
//! # Ok::<(), ctxlog::Error>(())
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod fault;
pub mod global;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;
pub mod testing;
pub mod value;
pub mod writer;

pub use builder::RegistryBuilder;
pub use config::{LogConfig, Target};
pub use context::{Context, ContextTracer, TraceId, Tracer};
pub use error::{Error, Result};
pub use event::Event;
pub use fault::{Fault, Recognizer, StructuredError};
pub use global::{
    cancel, debug, enable_pretty_mode, error, extractor, fatal, global, info, is_pretty_mode,
    logger, namespace, register_structured, set_cancel_func, set_extractor, set_tracer, warn,
    with_context,
};
pub use level::Level;
pub use logger::Logger;
pub use record::Record;
pub use registry::{CancelFunc, Extractor, Registry};
pub use value::{Fields, LogObject, Value};
pub use writer::{JsonWriter, PrettyWriter, RecordWriter, TracingWriter};

/// Start configuring a [`Registry`].
pub fn builder() -> RegistryBuilder {
    RegistryBuilder::new()
}
