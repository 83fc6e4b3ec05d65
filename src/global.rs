//! The process-wide registry behind the crate-level free functions.
//!
//! The registry is created on first use with default settings unless one was
//! installed earlier through [`RegistryBuilder::install`](crate::RegistryBuilder::install).
//! Hooks and pretty mode should be configured during startup, before the
//! first event is emitted.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::registry::Extractor;
use crate::{
    Context, Error, Event, Fields, Logger, RecordWriter, Registry, Result, StructuredError, Tracer,
};

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// The process-wide registry.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::new)
}

pub(crate) fn install(registry: Registry) -> Result<&'static Registry> {
    GLOBAL
        .set(registry)
        .map_err(|_| Error::Init("global registry is already initialized".to_string()))?;
    Ok(global())
}

/// Switch the process-wide registry to human-readable output.
///
/// Equivalent to setting `PRETTY_LOGGER=true` before the first event.
pub fn enable_pretty_mode() {
    global().enable_pretty_mode();
}

pub fn is_pretty_mode() -> bool {
    global().is_pretty_mode()
}

/// The process-wide writer handle, built on first call.
pub fn logger() -> Arc<dyn RecordWriter> {
    Arc::clone(global().logger())
}

pub fn set_extractor<F>(extractor: F)
where
    F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
{
    global().set_extractor(extractor);
}

pub fn extractor() -> Option<Extractor> {
    global().extractor()
}

pub fn set_tracer<T: Tracer + 'static>(tracer: T) {
    global().set_tracer(tracer);
}

pub fn set_cancel_func<F>(cancel: F)
where
    F: Fn() + Send + Sync + 'static,
{
    global().set_cancel_func(cancel);
}

/// Recognize `T` as a structured error in events from the process-wide
/// registry.
pub fn register_structured<T: StructuredError + 'static>() {
    global().register_structured::<T>();
}

/// Invoke the process-wide cancel function, if one is registered.
pub fn cancel() {
    global().cancel();
}

pub fn debug() -> Event<'static> {
    global().debug()
}

pub fn info() -> Event<'static> {
    global().info()
}

pub fn warn() -> Event<'static> {
    global().warn()
}

pub fn error() -> Event<'static> {
    global().error()
}

/// Error-level event with `fatal=true`.
///
/// Instead of exiting, the process-wide cancel function is invoked once the
/// event is emitted or dropped, so the application can shut down gracefully.
/// An event that is held keeps shutdown waiting, and one passed to
/// [`std::mem::forget`] never requests it.
pub fn fatal() -> Event<'static> {
    global().fatal()
}

/// Logger bound to a background context and `namespace`.
pub fn namespace(namespace: impl Into<String>) -> Logger<'static> {
    global().namespace(namespace)
}

/// Logger bound to `ctx` and `namespace`.
pub fn with_context(ctx: Context, namespace: impl Into<String>) -> Logger<'static> {
    global().with_context(ctx, namespace)
}
