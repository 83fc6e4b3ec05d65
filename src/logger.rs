use crate::{Context, Event, Registry};

/// A logger bound to a context and a namespace.
///
/// Every level method starts a fresh [`Event`], binds the context with
/// [`Event::ctx`] and adds the namespace with [`Event::namespace`].
#[derive(Debug, Clone)]
pub struct Logger<'r> {
    registry: &'r Registry,
    ctx: Context,
    namespace: String,
}

impl<'r> Logger<'r> {
    pub(crate) fn new(registry: &'r Registry, ctx: Context, namespace: impl Into<String>) -> Self {
        Self {
            registry,
            ctx,
            namespace: namespace.into(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn bind(&self, event: Event<'r>) -> Event<'r> {
        event.ctx(&self.ctx).namespace(&self.namespace)
    }

    pub fn debug(&self) -> Event<'r> {
        self.bind(self.registry.debug())
    }

    pub fn info(&self) -> Event<'r> {
        self.bind(self.registry.info())
    }

    pub fn warn(&self) -> Event<'r> {
        self.bind(self.registry.warn())
    }

    pub fn error(&self) -> Event<'r> {
        self.bind(self.registry.error())
    }

    /// Error-level event with `fatal=true`; requests shutdown through the
    /// registry's cancel function once the event is emitted or dropped. See
    /// [`Registry::fatal`] for when that happens.
    pub fn fatal(&self) -> Event<'r> {
        self.bind(self.registry.fatal())
    }
}
