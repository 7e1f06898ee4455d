//! Underlying error types used over the whole workspace.
//!
//! Every crate defines its own error enums and converts them into the
//! top-level [`Error`] through the macros in this crate, so callers can
//! match on the broad [`ErrorKind`] and still downcast to the precise
//! reason when they need it.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use derive_more::Display;
use thiserror::Error;

#[macro_use]
#[doc(hidden)]
pub mod util;

mod internal;

pub use internal::{InternalError, InternalErrorKind, OtherError, SilentError};

/// A wrapper around a dynamic error type, kept behind an `Arc` so the
/// enclosing [`Error`] stays cheaply clonable.
#[derive(Clone, Debug)]
pub struct AnyError(Arc<anyhow::Error>);

/// A list specifying general categories of atelier errors.
///
/// Each variant maps to one layer of the store; the variant alone tells a
/// caller which subsystem rejected the operation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum ErrorKind {
    /// Variant conversion or comparison failure.
    Value,
    /// Identifier allocation or reservation failure.
    Identity,
    /// Frame population or mutation failure.
    Frame,
    /// Referential-integrity, hierarchy, or constraint failure.
    Verification,
    /// Design lifecycle or history failure.
    Design,
    /// Raw-design validation or resolution failure.
    Loader,
    /// Internal error.
    Internal,
}

def_error_base_on_kind!(
    Error,
    ErrorKind,
    "Top-level error type of the atelier workspace."
);

impl<E> From<E> for AnyError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self(Arc::new(error.into()))
    }
}

impl Deref for AnyError {
    type Target = Arc<anyhow::Error>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
