//! Structured errors.
//!
//! [`Event::err`](crate::Event::err) expands an error implementing
//! [`StructuredError`] into several fields instead of one opaque `error`
//! field. The error itself and every link of its `source()` chain are
//! checked. [`Fault`] is always recognized; other implementations are
//! recognized once registered with
//! [`Registry::register_structured`](crate::Registry::register_structured).
//! A value already known to be structured can be passed directly to
//! [`Event::err_structured`](crate::Event::err_structured).

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use crate::Value;

/// The shape of an error that can be logged field by field.
pub trait StructuredError: StdError {
    /// Type tag, e.g. `"NotFound"`. Empty means untagged.
    fn error_type(&self) -> &str;

    fn message(&self) -> &str;

    /// The wrapped cause, if any.
    fn inner_error(&self) -> Option<&(dyn StdError + 'static)>;

    /// Extra key/value context attached where the error was raised.
    fn context(&self) -> Option<&BTreeMap<String, Value>>;
}

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A tagged error with optional cause and context.
///
/// ```
/// use ctxlog::Fault;
///
/// let err = Fault::new("user not found")
///     .with_type("NotFound")
///     .with_context("user_id", 42);
/// assert_eq!(err.to_string(), "user not found");
/// ```
#[derive(Debug)]
pub struct Fault {
    kind: String,
    message: String,
    inner: Option<BoxError>,
    context: BTreeMap<String, Value>,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: String::new(),
            message: message.into(),
            inner: None,
            context: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_inner(mut self, inner: impl Into<BoxError>) -> Self {
        self.inner = Some(inner.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl StructuredError for Fault {
    fn error_type(&self) -> &str {
        &self.kind
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn inner_error(&self) -> Option<&(dyn StdError + 'static)> {
        self.source()
    }

    fn context(&self) -> Option<&BTreeMap<String, Value>> {
        if self.context.is_empty() {
            None
        } else {
            Some(&self.context)
        }
    }
}

/// Views an error as a [`StructuredError`] when it has the expected
/// concrete type.
pub type Recognizer = for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a dyn StructuredError>;

/// The [`Recognizer`] for `T`.
pub fn recognize<'a, T: StructuredError + 'static>(
    err: &'a (dyn StdError + 'static),
) -> Option<&'a dyn StructuredError> {
    err.downcast_ref::<T>().map(|e| e as &dyn StructuredError)
}

/// Finds the first [`Fault`] on `err` or its `source()` chain.
pub fn as_structured<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a dyn StructuredError> {
    as_structured_with(err, &[])
}

/// Finds the first structured error on `err` or its `source()` chain,
/// trying [`Fault`] and then each of `recognizers` at every link.
pub fn as_structured_with<'a>(
    err: &'a (dyn StdError + 'static),
    recognizers: &[Recognizer],
) -> Option<&'a dyn StructuredError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = recognize::<Fault>(e) {
            return Some(found);
        }
        if let Some(found) = recognizers.iter().find_map(|recognizer| recognizer(e)) {
            return Some(found);
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Wrapper(Fault);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped: {}", self.0)
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_fault_accessors() {
        let fault = Fault::new("boom")
            .with_type("Internal")
            .with_inner(io::Error::other("disk full"))
            .with_context("path", "/tmp/x");

        assert_eq!(fault.error_type(), "Internal");
        assert_eq!(fault.message(), "boom");
        assert_eq!(fault.inner_error().unwrap().to_string(), "disk full");
        assert_eq!(
            fault.context().unwrap().get("path"),
            Some(&Value::from("/tmp/x"))
        );
    }

    #[test]
    fn test_empty_context_is_none() {
        let fault = Fault::new("boom");
        assert!(fault.context().is_none());
        assert!(fault.inner_error().is_none());
        assert_eq!(fault.error_type(), "");
    }

    #[test]
    fn test_as_structured_direct() {
        let fault = Fault::new("boom");
        let err: &(dyn StdError + 'static) = &fault;
        assert_eq!(as_structured(err).unwrap().message(), "boom");
    }

    #[test]
    fn test_as_structured_walks_source_chain() {
        let wrapper = Wrapper(Fault::new("deep").with_type("T"));
        let found = as_structured(&wrapper).unwrap();
        assert_eq!(found.error_type(), "T");
        assert_eq!(found.message(), "deep");
    }

    #[derive(Debug)]
    struct Layer(Box<dyn StdError + Send + Sync>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "layer: {}", self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self.0.as_ref())
        }
    }

    #[derive(Debug)]
    struct Denied {
        cause: io::Error,
    }

    impl fmt::Display for Denied {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("denied")
        }
    }

    impl StdError for Denied {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.cause)
        }
    }

    impl StructuredError for Denied {
        fn error_type(&self) -> &str {
            "Denied"
        }

        fn message(&self) -> &str {
            "denied"
        }

        fn inner_error(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.cause)
        }

        fn context(&self) -> Option<&BTreeMap<String, Value>> {
            None
        }
    }

    #[test]
    fn test_as_structured_needs_recognizer_for_custom_types() {
        let err = Denied {
            cause: io::Error::other("no key"),
        };
        assert!(as_structured(&err).is_none());

        let found = as_structured_with(&err, &[recognize::<Denied>]).unwrap();
        assert_eq!(found.error_type(), "Denied");
    }

    #[test]
    fn test_as_structured_with_walks_chain_for_custom_types() {
        let outer = Fault::new("outer").with_inner(Denied {
            cause: io::Error::other("no key"),
        });
        // The outer fault is the first link and wins.
        let found = as_structured_with(&outer, &[recognize::<Denied>]).unwrap();
        assert_eq!(found.message(), "outer");

        let layered = Layer(Box::new(Denied {
            cause: io::Error::other("no key"),
        }));
        let found = as_structured_with(&layered, &[recognize::<Denied>]).unwrap();
        assert_eq!(found.message(), "denied");

        let plain = io::Error::other("plain");
        assert!(as_structured_with(&plain, &[recognize::<Denied>]).is_none());
    }

    #[test]
    fn test_as_structured_plain_error() {
        let err = io::Error::other("plain");
        assert!(as_structured(&err).is_none());
    }
}
