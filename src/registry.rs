//! Logging state shared by events and loggers.
//!
//! A [`Registry`] owns the lazily built writer handle, the pretty-mode flag
//! and the hooks consulted while events are built. The free functions at the
//! crate root use a process-wide registry (see [`global`](crate::global));
//! tests and embedders can build their own with [`builder`](crate::builder).

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;

use crate::config::{self, EnvLookup, LogConfig};
use crate::fault::{self, Recognizer};
use crate::writer::{self, JsonWriter, RecordWriter};
use crate::{Context, Event, Fields, Level, Logger, RegistryBuilder, StructuredError, Tracer};

/// Hook that derives extra fields from a context.
pub type Extractor = Arc<dyn Fn(&Context, &mut Fields) + Send + Sync>;

/// Cooperative shutdown trigger invoked by fatal events.
pub type CancelFunc = Arc<dyn Fn() + Send + Sync>;

/// Builds the writer on first use. Receives the config and the effective
/// pretty flag.
pub type WriterFactory = Box<dyn Fn(&LogConfig, bool) -> Arc<dyn RecordWriter> + Send + Sync>;

pub struct Registry {
    config: LogConfig,
    pretty: AtomicBool,
    writer: OnceCell<Arc<dyn RecordWriter>>,
    make_writer: WriterFactory,
    extractor: RwLock<Option<Extractor>>,
    tracer: RwLock<Option<Arc<dyn Tracer>>>,
    cancel: RwLock<Option<CancelFunc>>,
    structured: RwLock<Vec<(TypeId, Recognizer)>>,
    env: EnvLookup,
}

impl Registry {
    /// A registry with default configuration, the default writer selection
    /// and the [`ContextTracer`](crate::ContextTracer).
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    pub(crate) fn from_parts(
        config: LogConfig,
        make_writer: Option<WriterFactory>,
        extractor: Option<Extractor>,
        tracer: Option<Arc<dyn Tracer>>,
        cancel: Option<CancelFunc>,
        structured: Vec<(TypeId, Recognizer)>,
    ) -> Self {
        Self {
            pretty: AtomicBool::new(config.pretty),
            config,
            writer: OnceCell::new(),
            make_writer: make_writer.unwrap_or_else(|| Box::new(default_writer) as WriterFactory),
            extractor: RwLock::new(extractor),
            tracer: RwLock::new(tracer),
            cancel: RwLock::new(cancel),
            structured: RwLock::new(structured),
            env: config::process_env,
        }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Switch to human-readable output. Only effective before the writer is
    /// built by the first [`logger`](Self::logger) call.
    pub fn enable_pretty_mode(&self) {
        self.pretty.store(true, Ordering::Release);
    }

    pub fn is_pretty_mode(&self) -> bool {
        self.pretty.load(Ordering::Acquire)
    }

    /// The writer handle, built exactly once.
    ///
    /// The first call consults `PRETTY_LOGGER`/`PRETTY_LOG` unless pretty mode
    /// was already enabled, then builds the writer. Concurrent first calls
    /// block until the single initialization finishes and observe the same
    /// handle.
    pub fn logger(&self) -> &Arc<dyn RecordWriter> {
        self.writer.get_or_init(|| {
            if !self.is_pretty_mode() && config::pretty_from_env(self.env) {
                self.enable_pretty_mode();
            }
            let pretty = self.is_pretty_mode();
            tracing::debug!(pretty, level = %self.config.level, "initializing log writer");
            (self.make_writer)(&self.config, pretty)
        })
    }

    /// Register the context field extractor. Last write wins.
    pub fn set_extractor<F>(&self, extractor: F)
    where
        F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
    {
        let extractor: Extractor = Arc::new(extractor);
        store(&self.extractor, Some(extractor));
    }

    pub fn extractor(&self) -> Option<Extractor> {
        load(&self.extractor)
    }

    /// Register the trace id lookup. Last write wins.
    pub fn set_tracer<T: Tracer + 'static>(&self, tracer: T) {
        store(&self.tracer, Some(Arc::new(tracer) as Arc<dyn Tracer>));
    }

    /// Remove the trace id lookup; no `trace_id` field is added afterwards.
    pub fn clear_tracer(&self) {
        store(&self.tracer, None);
    }

    pub fn tracer(&self) -> Option<Arc<dyn Tracer>> {
        load(&self.tracer)
    }

    /// Register the shutdown trigger. It may be invoked many times.
    pub fn set_cancel_func<F>(&self, cancel: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let cancel: CancelFunc = Arc::new(cancel);
        store(&self.cancel, Some(cancel));
    }

    /// Recognize `T` as a structured error in [`Event::err`], on the error
    /// itself or anywhere along its `source()` chain. [`Fault`](crate::Fault)
    /// is always recognized. Registering a type twice has no effect.
    pub fn register_structured<T: StructuredError + 'static>(&self) {
        let mut recognizers = self
            .structured
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = TypeId::of::<T>();
        if !recognizers.iter().any(|(known, _)| *known == id) {
            recognizers.push((id, fault::recognize::<T> as Recognizer));
        }
    }

    pub(crate) fn recognizers(&self) -> Vec<Recognizer> {
        self.structured
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, recognizer)| *recognizer)
            .collect()
    }

    /// Invoke the registered shutdown trigger; no-op without one.
    pub fn cancel(&self) {
        if let Some(cancel) = load(&self.cancel) {
            tracing::debug!("invoking registered cancel function");
            cancel();
        }
    }

    /// Start an event at `level`.
    pub fn new_event(&self, level: Level) -> Event<'_> {
        Event::new(self, level)
    }

    pub fn debug(&self) -> Event<'_> {
        self.new_event(Level::Debug)
    }

    pub fn info(&self) -> Event<'_> {
        self.new_event(Level::Info)
    }

    pub fn warn(&self) -> Event<'_> {
        self.new_event(Level::Warn)
    }

    pub fn error(&self) -> Event<'_> {
        self.new_event(Level::Error)
    }

    /// Error-level event with `fatal=true`.
    ///
    /// The registered cancel function runs once for every call, when the
    /// returned event is emitted or dropped. Holding the event delays it until
    /// then, and an event passed to [`std::mem::forget`] never triggers it.
    pub fn fatal(&self) -> Event<'_> {
        Event::fatal(self)
    }

    /// Logger bound to a background context and `namespace`.
    pub fn namespace(&self, namespace: impl Into<String>) -> Logger<'_> {
        Logger::new(self, Context::background(), namespace)
    }

    /// Logger bound to `ctx` and `namespace`.
    pub fn with_context(&self, ctx: Context, namespace: impl Into<String>) -> Logger<'_> {
        Logger::new(self, ctx, namespace)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("pretty", &self.is_pretty_mode())
            .field("initialized", &self.writer.get().is_some())
            .finish_non_exhaustive()
    }
}

fn default_writer(config: &LogConfig, pretty: bool) -> Arc<dyn RecordWriter> {
    writer::from_config(config, pretty).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not build configured writer, using stderr");
        Arc::new(JsonWriter::new(std::io::stderr))
    })
}

fn load<T: Clone>(slot: &RwLock<Option<T>>) -> Option<T> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn store<T>(slot: &RwLock<Option<T>>, value: Option<T>) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = value;
}
