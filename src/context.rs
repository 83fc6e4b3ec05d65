//! Request-scoped context and trace id lookup.
//!
//! A [`Context`] is an immutable, cheaply cloneable bag of context-scoped
//! fields and typed values. Every `with_*` call returns a new context and
//! leaves the receiver untouched.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Fields, Value};

type Values = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

#[derive(Clone, Default)]
pub struct Context {
    fields: Arc<Fields>,
    values: Arc<Values>,
}

impl Context {
    /// An empty context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context carrying an extra field. Fields are copied
    /// into every event the context is bound to.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut child = self.clone();
        Arc::make_mut(&mut child.fields).push(key, value);
        child
    }

    /// Returns a child context carrying a typed value. A later value of the
    /// same type shadows an earlier one.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        let mut child = self.clone();
        Arc::make_mut(&mut child.values).insert(TypeId::of::<T>(), Arc::new(value));
        child
    }

    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns a child context carrying a trace id, readable by [`ContextTracer`].
    pub fn with_trace_id(&self, id: impl Into<String>) -> Self {
        self.with_value(TraceId(id.into()))
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.value::<TraceId>().map(|t| t.0.as_str())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("fields", &self.fields)
            .field("values", &self.values.len())
            .finish()
    }
}

/// Trace identifier stored in a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

/// Looks up the trace id of a context.
pub trait Tracer: Send + Sync {
    fn get(&self, ctx: &Context) -> Option<String>;
}

impl<F> Tracer for F
where
    F: Fn(&Context) -> Option<String> + Send + Sync,
{
    fn get(&self, ctx: &Context) -> Option<String> {
        self(ctx)
    }
}

/// Reads the id set by [`Context::with_trace_id`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextTracer;

impl Tracer for ContextTracer {
    fn get(&self, ctx: &Context) -> Option<String> {
        ctx.trace_id().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct UserId(u64);

    #[test]
    fn test_background_is_empty() {
        let ctx = Context::background();
        assert!(ctx.fields().is_empty());
        assert!(ctx.trace_id().is_none());
        assert!(ctx.value::<UserId>().is_none());
    }

    #[test]
    fn test_with_field_does_not_touch_parent() {
        let parent = Context::background().with_field("a", 1i32);
        let child = parent.with_field("b", "x");

        assert_eq!(parent.fields().len(), 1);
        assert_eq!(child.fields().len(), 2);
        assert_eq!(child.fields().get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn test_typed_values_shadow() {
        let ctx = Context::background().with_value(UserId(1));
        let shadowed = ctx.with_value(UserId(2));

        assert_eq!(ctx.value::<UserId>(), Some(&UserId(1)));
        assert_eq!(shadowed.value::<UserId>(), Some(&UserId(2)));
    }

    #[test]
    fn test_context_tracer_reads_trace_id() {
        let ctx = Context::background().with_trace_id("abc-123");
        assert_eq!(ContextTracer.get(&ctx), Some("abc-123".to_string()));
        assert_eq!(ContextTracer.get(&Context::background()), None);
    }

    #[test]
    fn test_closure_tracer() {
        let tracer = |ctx: &Context| ctx.value::<UserId>().map(|u| format!("user-{}", u.0));
        let ctx = Context::background().with_value(UserId(7));
        assert_eq!(tracer.get(&ctx), Some("user-7".to_string()));
    }
}
