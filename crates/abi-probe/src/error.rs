//! Errors surfaced by bindings and probes.

use thiserror::Error;

use crate::cell::CellError;
use crate::runtime::{InvocationError, InvocationErrorKind};
use crate::wire::StackError;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("get-method '{method}' failed: {source}")]
    Invocation {
        method: String,
        #[source]
        source: InvocationError,
    },

    #[error("get-method '{method}' returned an unexpected result: {source}")]
    Shape {
        method: String,
        #[source]
        source: StackError,
    },

    #[error("message '{message}' could not be serialized: {source}")]
    Payload {
        message: String,
        #[source]
        source: CellError,
    },

    #[error("message '{message}' could not be sent: {source}")]
    Send {
        message: String,
        #[source]
        source: InvocationError,
    },

    #[error("'{member}' is not a member of interface '{interface}'")]
    UnknownMember { interface: String, member: String },

    #[error("'{member}' takes {expected} arguments, {found} given")]
    Arity {
        member: String,
        expected: usize,
        found: usize,
    },

    #[error("argument '{name}' of '{member}': expected {expected}, found {found}")]
    Argument {
        member: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl BindingError {
    pub fn invocation(method: &str, source: InvocationError) -> Self {
        BindingError::Invocation {
            method: method.to_string(),
            source,
        }
    }

    pub fn shape(method: &str, source: StackError) -> Self {
        BindingError::Shape {
            method: method.to_string(),
            source,
        }
    }

    pub fn payload(message: &str, source: CellError) -> Self {
        BindingError::Payload {
            message: message.to_string(),
            source,
        }
    }

    pub fn send(message: &str, source: InvocationError) -> Self {
        BindingError::Send {
            message: message.to_string(),
            source,
        }
    }

    /// The invocation category, when the runtime rejected the call.
    pub fn invocation_kind(&self) -> Option<InvocationErrorKind> {
        match self {
            BindingError::Invocation { source, .. } | BindingError::Send { source, .. } => {
                Some(source.kind)
            }
            _ => None,
        }
    }
}

/// A single probe did not pass.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("no probe named '{0}'")]
    UnknownProbe(String),
}
