//! Unified error types for product-runtime.
//!
//! Load failures, query contract violations and delta engine violations all
//! surface through [`TocError`]. Not-found conditions are never errors; they
//! are reported as `None` by the query methods.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for product-runtime operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TocError {
    /// Structural errors while loading a table of contents
    #[error("Failed to load table of contents: {context}")]
    Load {
        context: String,
        #[source]
        source: LoadErrorKind,
    },

    /// Query contract violations
    #[error("Invalid query: {0}")]
    Query(#[source] QueryErrorKind),

    /// Mutation requested on a read-only index
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Structural delta engine violations
    #[error("Delta computation failed: {0}")]
    Delta(#[source] DeltaErrorKind),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific load error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadErrorKind {
    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Unexpected root element '{found}' (expected '{expected}')")]
    UnexpectedRoot { found: String, expected: String },

    #[error("No entry factory registered for element '{0}'")]
    UnknownEntryTag(String),

    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute { attribute: String, element: String },

    #[error("Invalid value for attribute '{attribute}': {message}")]
    InvalidAttribute { attribute: String, message: String },
}

/// Specific query error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum QueryErrorKind {
    #[error("versionId must be given when looking up kind '{kind_id}'")]
    MissingVersionId { kind_id: String },
}

/// Specific delta error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DeltaErrorKind {
    #[error("A delta needs an original or a reference object; both were absent")]
    NoAnchorObject,

    #[error("Cyclic object graph: {type_name} reached twice through association '{association}'")]
    CyclicGraph {
        type_name: String,
        association: String,
    },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for product-runtime operations
pub type Result<T> = std::result::Result<T, TocError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl TocError {
    /// Create a load error with context
    pub fn load(context: impl Into<String>, source: LoadErrorKind) -> Self {
        Self::Load {
            context: context.into(),
            source,
        }
    }

    /// Create a load error for a missing attribute
    pub fn missing_attribute(attribute: impl Into<String>, element: impl Into<String>) -> Self {
        Self::load(
            "missing required attribute",
            LoadErrorKind::MissingAttribute {
                attribute: attribute.into(),
                element: element.into(),
            },
        )
    }

    /// Create a load error for an attribute that does not parse
    pub fn invalid_attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::load(
            "invalid attribute value",
            LoadErrorKind::InvalidAttribute {
                attribute: attribute.into(),
                message: message.into(),
            },
        )
    }

    /// Create a load error for an element without a registered factory
    pub fn unknown_tag(tag: impl Into<String>) -> Self {
        Self::load("unknown entry", LoadErrorKind::UnknownEntryTag(tag.into()))
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for TocError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<quick_xml::Error> for TocError {
    fn from(err: quick_xml::Error) -> Self {
        Self::load("XML reading", LoadErrorKind::InvalidXml(err.to_string()))
    }
}

impl From<DeltaErrorKind> for TocError {
    fn from(kind: DeltaErrorKind) -> Self {
        Self::Delta(kind)
    }
}

impl From<QueryErrorKind> for TocError {
    fn from(kind: QueryErrorKind) -> Self {
        Self::Query(kind)
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain outermost-first, so an error raised while reading
/// a generation of some product reads
/// `"loading toc.xml: entry 'motor.2024-01': missing required attribute"`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<TocError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// Only variants that carry a free-form context string are extended; the
/// structured variants pass through untouched.
fn add_context_to_error(err: TocError, new_ctx: &str) -> TocError {
    match err {
        TocError::Load {
            context: existing,
            source,
        } => TocError::Load {
            context: chain_context(new_ctx, &existing),
            source,
        },
        TocError::Io {
            path,
            message,
            source,
        } => TocError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        TocError::Unsupported(msg) => TocError::Unsupported(chain_context(new_ctx, &msg)),
        TocError::Config(msg) => TocError::Config(chain_context(new_ctx, &msg)),
        TocError::Validation(msg) => TocError::Validation(chain_context(new_ctx, &msg)),
        other => other,
    }
}

/// Chain two context strings together.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| TocError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| TocError::Validation(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TocError::unknown_tag("Widget");
        let display = err.to_string();
        assert!(display.contains("load"), "unexpected message: {display}");

        let err = TocError::missing_attribute("id", "ProductComponent");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Missing required attribute 'id' on <ProductComponent>")
        );
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = TocError::io("/path/to/toc.xml", io_err);

        assert!(err.to_string().contains("/path/to/toc.xml"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(TocError::load(
                "base",
                LoadErrorKind::InvalidXml("eof".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(TocError::Load { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn test_context_leaves_structured_variants_alone() {
        let err: Result<()> = Err(TocError::Delta(DeltaErrorKind::NoAnchorObject));
        assert!(matches!(
            err.context("comparing"),
            Err(TocError::Delta(DeltaErrorKind::NoAnchorObject))
        ));
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(TocError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(TocError::Validation(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert_eq!(Some(7).context_none("unused").ok(), Some(7));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("outer", "middle: inner"), "outer: middle: inner");
    }
}
