//! The per-call event builder.
//!
//! An [`Event`] is created by a level function, accumulates typed fields
//! through chained setters and is finalized by [`send`](Event::send),
//! [`msg`](Event::msg) or [`msgf`](Event::msgf). Finalizers consume the
//! builder; an event dropped without finalization writes nothing.
//!
//! ```
//! use std::sync::Arc;
//! use ctxlog::testing::CaptureWriter;
//!
//! let capture = CaptureWriter::new();
//! let registry = ctxlog::builder().with_writer(Arc::clone(&capture)).build();
//!
//! registry
//!     .info()
//!     .str("user", "alice")
//!     .i32("attempt", 2)
//!     .msgf(format_args!("login {}", "ok"));
//!
//! let record = capture.last().unwrap();
//! assert_eq!(record.message(), Some("login ok"));
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::fault::as_structured_with;
use crate::record::ERROR_KEY;
use crate::{
    Context, Fields, Level, LogObject, Record, RecordWriter, Registry, StructuredError, Value,
};

macro_rules! scalar_setters {
    ($($(#[$meta:meta])* $name:ident($ty:ty);)*) => {
        $(
            $(#[$meta])*
            pub fn $name(self, key: &str, value: $ty) -> Self {
                self.field(key, || Value::from(value))
            }
        )*
    };
}

macro_rules! slice_setters {
    ($($(#[$meta:meta])* $name:ident($ty:ty);)*) => {
        $(
            $(#[$meta])*
            pub fn $name(self, key: &str, values: &[$ty]) -> Self {
                self.array(key, values, |v| Value::from(*v))
            }
        )*
    };
}

/// Calls the registry's cancel function when dropped.
struct FatalGuard<'r> {
    registry: &'r Registry,
}

impl Drop for FatalGuard<'_> {
    fn drop(&mut self) {
        self.registry.cancel();
    }
}

/// One in-flight log record.
#[must_use = "an event writes nothing until `send`, `msg` or `msgf` is called"]
pub struct Event<'r> {
    registry: &'r Registry,
    writer: Arc<dyn RecordWriter>,
    /// `None` when the level is below the registry's minimum.
    record: Option<Record>,
    fatal: Option<FatalGuard<'r>>,
}

impl<'r> Event<'r> {
    pub(crate) fn new(registry: &'r Registry, level: Level) -> Self {
        let writer = Arc::clone(registry.logger());
        let record = (level >= registry.config().level).then(|| Record::new(level));
        Self {
            registry,
            writer,
            record,
            fatal: None,
        }
    }

    pub(crate) fn fatal(registry: &'r Registry) -> Self {
        let mut event = Self::new(registry, Level::Error).bool("fatal", true);
        event.fatal = Some(FatalGuard { registry });
        event
    }

    /// Whether finalizing this event writes a record.
    pub fn enabled(&self) -> bool {
        self.record.is_some()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    fn field(mut self, key: &str, value: impl FnOnce() -> Value) -> Self {
        if let Some(record) = self.record.as_mut() {
            record.fields.push(key, value());
        }
        self
    }

    // Empty slices are the absent sentinel and add nothing.
    fn array<T>(self, key: &str, values: &[T], map: impl Fn(&T) -> Value) -> Self {
        if values.is_empty() {
            return self;
        }
        self.field(key, || Value::Array(values.iter().map(map).collect()))
    }

    scalar_setters! {
        bool(bool);
        /// Platform-width signed integer.
        int(isize);
        i8(i8);
        i16(i16);
        i32(i32);
        i64(i64);
        /// Platform-width unsigned integer.
        uint(usize);
        u8(u8);
        u16(u16);
        u32(u32);
        u64(u64);
        f32(f32);
        f64(f64);
        time(OffsetDateTime);
        /// Written as fractional milliseconds by the JSON writer.
        dur(Duration);
    }

    slice_setters! {
        bools(bool);
        ints(isize);
        i8s(i8);
        i16s(i16);
        i32s(i32);
        i64s(i64);
        uints(usize);
        u8s(u8);
        u16s(u16);
        u32s(u32);
        u64s(u64);
        f32s(f32);
        f64s(f64);
        times(OffsetDateTime);
        durs(Duration);
    }

    pub fn str(self, key: &str, value: &str) -> Self {
        self.field(key, || Value::from(value))
    }

    pub fn strs<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
        self.array(key, values, |v| Value::from(AsRef::<str>::as_ref(v)))
    }

    pub fn bytes(self, key: &str, value: &[u8]) -> Self {
        self.field(key, || Value::Bytes(value.to_vec()))
    }

    /// Adds `value` in its `serde` form. A value that fails to serialize is
    /// recorded as the serialization error text.
    pub fn any<T: Serialize + ?Sized>(self, key: &str, value: &T) -> Self {
        self.field(key, || match serde_json::to_value(value) {
            Ok(json) => Value::Json(json),
            Err(e) => Value::Str(e.to_string()),
        })
    }

    /// Adds the `Display` text of `value` as a string field.
    pub fn obj<T: fmt::Display + ?Sized>(self, key: &str, value: &T) -> Self {
        self.field(key, || Value::Str(value.to_string()))
    }

    /// Adds the `Display` text of every item as a string sequence. An empty
    /// list adds nothing.
    pub fn arr<I>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        let texts: Vec<Value> = values
            .into_iter()
            .map(|v| Value::Str(v.to_string()))
            .collect();
        if texts.is_empty() {
            return self;
        }
        self.field(key, || Value::Array(texts))
    }

    /// Adds a nested object built by `value`.
    pub fn object<T: LogObject + ?Sized>(self, key: &str, value: &T) -> Self {
        self.field(key, || {
            let mut fields = Fields::new();
            value.log_fields(&mut fields);
            Value::Object(fields)
        })
    }

    /// Adds the type name of `T`.
    pub fn type_of<T: ?Sized>(self, key: &str, _value: &T) -> Self {
        self.field(key, || Value::from(std::any::type_name::<T>()))
    }

    /// Adds the hyphenated form of `id`.
    pub fn uuid(self, key: &str, id: Uuid) -> Self {
        self.field(key, || Value::Str(id.hyphenated().to_string()))
    }

    /// Adds a `namespace` field; an empty name adds nothing.
    pub fn namespace(self, namespace: &str) -> Self {
        if namespace.is_empty() {
            return self;
        }
        self.str("namespace", namespace)
    }

    /// Attaches an error.
    ///
    /// A structured error found on `err` or its source chain is expanded as
    /// in [`err_structured`](Self::err_structured). [`Fault`](crate::Fault)
    /// is always found; other [`StructuredError`] types must be registered
    /// with [`Registry::register_structured`]. Any other error becomes a
    /// single `error` field.
    pub fn err(self, err: Option<&(dyn StdError + 'static)>) -> Self {
        let Some(err) = err else {
            return self;
        };
        if !self.enabled() {
            return self;
        }

        let recognizers = self.registry.recognizers();
        match as_structured_with(err, &recognizers) {
            Some(structured) => self.expand(structured),
            None => self.str(ERROR_KEY, &err.to_string()),
        }
    }

    /// Attaches a structured error.
    ///
    /// Adds `error_type` (when tagged), `inner_error` (when wrapping a
    /// cause), one string field per context entry and `message`.
    pub fn err_structured(self, err: Option<&dyn StructuredError>) -> Self {
        match err {
            Some(structured) if self.enabled() => self.expand(structured),
            _ => self,
        }
    }

    fn expand(mut self, structured: &dyn StructuredError) -> Self {
        if !structured.error_type().is_empty() {
            self = self.str("error_type", structured.error_type());
        }
        if let Some(inner) = structured.inner_error() {
            self = self.str("inner_error", &inner.to_string());
        }
        if let Some(context) = structured.context() {
            for (key, value) in context {
                self = self.obj(key, value);
            }
        }
        self.str("message", structured.message())
    }

    /// Adds the messages of `errs` as a string sequence.
    pub fn errs(self, key: &str, errs: &[&(dyn StdError + 'static)]) -> Self {
        self.field(key, || {
            Value::Array(errs.iter().map(|e| Value::Str(e.to_string())).collect())
        })
    }

    /// Binds a context.
    ///
    /// Copies the context's fields, adds `trace_id` when the registry's
    /// tracer finds one, then runs the registry's extractor hook. `None`
    /// adds nothing.
    pub fn ctx<'c>(mut self, ctx: impl Into<Option<&'c Context>>) -> Self {
        let Some(ctx) = ctx.into() else {
            return self;
        };
        let Some(record) = self.record.as_mut() else {
            return self;
        };

        for (key, value) in ctx.fields() {
            record.fields.push(key.clone(), value.clone());
        }

        if let Some(tracer) = self.registry.tracer()
            && let Some(trace_id) = tracer.get(ctx)
            && !trace_id.is_empty()
        {
            record.fields.push("trace_id", trace_id);
        }

        if let Some(extractor) = self.registry.extractor() {
            extractor(ctx, &mut record.fields);
        }

        self
    }

    /// Emits the record without a message.
    pub fn send(self) {
        self.finish(None);
    }

    /// Emits the record with `message`.
    pub fn msg(self, message: &str) {
        if self.enabled() {
            self.finish(Some(message.to_owned()));
        } else {
            self.finish(None);
        }
    }

    /// Emits the record with a formatted message.
    ///
    /// ```
    /// # let registry = ctxlog::Registry::new();
    /// # let id = 7;
    /// registry.warn().msgf(format_args!("retrying job {id}"));
    /// ```
    pub fn msgf(self, args: fmt::Arguments<'_>) {
        let message = self.enabled().then(|| args.to_string());
        self.finish(message);
    }

    fn finish(self, message: Option<String>) {
        let Event {
            registry,
            writer,
            record,
            fatal,
        } = self;

        if let Some(mut record) = record {
            record.message = message;
            if registry.config().timestamp {
                record.time = Some(OffsetDateTime::now_utc());
            }
            writer.write(&record);
        }

        drop(fatal);
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("record", &self.record)
            .field("fatal", &self.is_fatal())
            .finish_non_exhaustive()
    }
}
