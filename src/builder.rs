//! Builder pattern for assembling a [`Registry`].
//!
//! This module provides a fluent API for configuring the logging state in a
//! single chain of method calls, either as a private registry or as the
//! process-wide one.
//!
//! # Example
//!
//! ```rust,no_run
//! use ctxlog::Level;
//!
//! ctxlog::builder()
//!     .with_pretty(true)
//!     .with_level(Level::Info)
//!     .with_cancel_func(|| eprintln!("shutting down"))
//!     .install()
//!     .expect("Failed to initialize logging");
//!
//! ctxlog::info().str("component", "api").msg("ready");
//! ```

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::fault::{self, Recognizer};
use crate::registry::{CancelFunc, Extractor, WriterFactory};
use crate::{
    Context, ContextTracer, Fields, Level, LogConfig, RecordWriter, Registry, Result,
    StructuredError, Target, Tracer,
};

/// A builder for configuring and creating a [`Registry`].
pub struct RegistryBuilder {
    config: LogConfig,
    make_writer: Option<WriterFactory>,
    extractor: Option<Extractor>,
    tracer: Option<Arc<dyn Tracer>>,
    cancel: Option<CancelFunc>,
    structured: Vec<(TypeId, Recognizer)>,
}

impl RegistryBuilder {
    /// Create a RegistryBuilder with default configuration and the
    /// [`ContextTracer`].
    pub fn new() -> Self {
        Self::from_config(LogConfig::new())
    }

    /// Create a RegistryBuilder from an existing configuration.
    pub fn from_config(config: LogConfig) -> Self {
        Self {
            config,
            make_writer: None,
            extractor: None,
            tracer: Some(Arc::new(ContextTracer)),
            cancel: None,
            structured: Vec::new(),
        }
    }

    /// Enable or disable human-readable output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.config = self.config.with_pretty(pretty);
        self
    }

    /// Set the minimum emitted level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.config = self.config.with_level(level);
        self
    }

    /// Enable or disable the automatic `time` field.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.config = self.config.with_timestamp(timestamp);
        self
    }

    /// Set the output destination of the default writer.
    pub fn with_target(mut self, target: Target) -> Self {
        self.config = self.config.with_target(target);
        self
    }

    /// Use `writer` instead of the writer derived from the configuration.
    pub fn with_writer<W: RecordWriter + 'static>(self, writer: Arc<W>) -> Self {
        let writer: Arc<dyn RecordWriter> = writer;
        self.with_writer_factory(move |_, _| Arc::clone(&writer))
    }

    /// Build the writer with `factory` on first use.
    ///
    /// The factory receives the configuration and the effective pretty flag
    /// (configuration, programmatic switch or environment).
    pub fn with_writer_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&LogConfig, bool) -> Arc<dyn RecordWriter> + Send + Sync + 'static,
    {
        self.make_writer = Some(Box::new(factory));
        self
    }

    /// Register a hook that derives extra fields from a bound context.
    pub fn with_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Replace the trace id lookup.
    pub fn with_tracer<T: Tracer + 'static>(mut self, tracer: T) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    /// Do not look up trace ids at all.
    pub fn without_tracer(mut self) -> Self {
        self.tracer = None;
        self
    }

    /// Register the shutdown trigger invoked by fatal events.
    pub fn with_cancel_func<F>(mut self, cancel: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cancel = Some(Arc::new(cancel));
        self
    }

    /// Expand errors of type `T` field by field in
    /// [`Event::err`](crate::Event::err).
    pub fn with_structured<T: StructuredError + 'static>(mut self) -> Self {
        let id = TypeId::of::<T>();
        if !self.structured.iter().any(|(known, _)| *known == id) {
            self.structured.push((id, fault::recognize::<T> as Recognizer));
        }
        self
    }

    /// Get the current configuration without building.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Create the registry. The writer is not built until first use.
    pub fn build(self) -> Registry {
        Registry::from_parts(
            self.config,
            self.make_writer,
            self.extractor,
            self.tracer,
            self.cancel,
            self.structured,
        )
    }

    /// Build the registry and make it the process-wide one used by the free
    /// functions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Init`](crate::Error::Init) if the process-wide
    /// registry was already installed or already used.
    pub fn install(self) -> Result<&'static Registry> {
        crate::global::install(self.build())
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("config", &self.config)
            .field("custom_writer", &self.make_writer.is_some())
            .field("extractor", &self.extractor.is_some())
            .field("tracer", &self.tracer.is_some())
            .field("cancel", &self.cancel.is_some())
            .field("structured", &self.structured.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CaptureWriter;

    #[test]
    fn test_builder_new() {
        let builder = RegistryBuilder::new();
        let config = builder.config();
        assert!(!config.pretty);
        assert_eq!(config.level, Level::Debug);
        assert!(config.timestamp);
    }

    #[test]
    fn test_builder_chaining() {
        let builder = RegistryBuilder::new()
            .with_pretty(true)
            .with_level(Level::Warn)
            .with_timestamp(false)
            .with_target(Target::Tracing);

        let config = builder.config();
        assert!(config.pretty);
        assert_eq!(config.level, Level::Warn);
        assert!(!config.timestamp);
        assert_eq!(config.target, Some(Target::Tracing));
    }

    #[test]
    fn test_builder_from_config() {
        let original = LogConfig::new().with_level(Level::Error);
        let registry = RegistryBuilder::from_config(original).build();
        assert_eq!(registry.config().level, Level::Error);
    }

    #[test]
    fn test_builder_installs_context_tracer_by_default() {
        let registry = RegistryBuilder::new().build();
        assert!(registry.tracer().is_some());

        let registry = RegistryBuilder::new().without_tracer().build();
        assert!(registry.tracer().is_none());
    }

    #[test]
    fn test_builder_with_writer() {
        let capture = CaptureWriter::new();
        let registry = RegistryBuilder::new()
            .with_writer(Arc::clone(&capture))
            .build();

        registry.info().msg("hello");
        assert_eq!(capture.len(), 1);
    }

    #[test]
    fn test_builder_hooks() {
        let registry = RegistryBuilder::new()
            .with_extractor(|_, fields| fields.push("x", 1i32))
            .with_cancel_func(|| {})
            .build();
        assert!(registry.extractor().is_some());
    }

    #[test]
    fn test_builder_with_structured() {
        let registry = RegistryBuilder::new()
            .with_structured::<crate::Fault>()
            .with_structured::<crate::Fault>()
            .build();
        assert_eq!(registry.recognizers().len(), 1);
    }
}
