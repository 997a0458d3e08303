//! Capabilities the probe runtime consumes from its host.
//!
//! Neither trait says how a contract is reached: a node client, a local
//! emulator and a test double all fit behind the same interface.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::address::Address;
use crate::cell::Cell;
use crate::error::BindingError;
use crate::wire::{StackReader, WireValue};

/// Why a get-method invocation or message dispatch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationErrorKind {
    MethodNotFound,
    InvalidArguments,
    Unreachable,
    Other,
}

impl fmt::Display for InvocationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvocationErrorKind::MethodNotFound => "method not found",
            InvocationErrorKind::InvalidArguments => "invalid arguments",
            InvocationErrorKind::Unreachable => "target unreachable",
            InvocationErrorKind::Other => "invocation failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct InvocationError {
    pub kind: InvocationErrorKind,
    /// VM exit code, when the failure came from contract execution.
    pub exit_code: Option<i32>,
    pub message: String,
}

impl InvocationError {
    pub fn new(kind: InvocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: None,
            message: message.into(),
        }
    }

    /// Categorize a VM exit code: 11 is an unknown method, 4 rejected
    /// arguments, 2 an unresponsive target.
    pub fn from_exit_code(code: i32, message: impl Into<String>) -> Self {
        let kind = match code {
            11 => InvocationErrorKind::MethodNotFound,
            4 => InvocationErrorKind::InvalidArguments,
            2 => InvocationErrorKind::Unreachable,
            _ => InvocationErrorKind::Other,
        };
        Self {
            kind,
            exit_code: Some(code),
            message: message.into(),
        }
    }
}

/// One transaction produced by a dispatched message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionInfo {
    pub hash: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Result handle of a dispatched message. Carries no verdict about business
/// success; inspect the transactions for that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub transactions: Vec<TransactionInfo>,
}

/// Runs read-only get-methods.
#[async_trait::async_trait]
pub trait MethodInvoker: Send + Sync {
    async fn invoke_query(
        &self,
        address: &Address,
        method: &str,
        args: Vec<WireValue>,
    ) -> Result<Vec<WireValue>, InvocationError>;
}

/// Dispatches internal messages carrying a serialized body.
#[async_trait::async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        address: &Address,
        payload: Cell,
    ) -> Result<SendOutcome, InvocationError>;
}

/// Both capabilities; what bindings hold.
pub trait ContractRuntime: MethodInvoker + MessageSender {}

impl<T: MethodInvoker + MessageSender + ?Sized> ContractRuntime for T {}

/// Invoke a get-method and wrap the result stack for positional reading.
pub async fn invoke_query(
    runtime: &dyn ContractRuntime,
    address: &Address,
    method: &str,
    args: Vec<WireValue>,
) -> Result<StackReader, BindingError> {
    debug!(%address, method, args = args.len(), "invoking get-method");
    let items = runtime
        .invoke_query(address, method, args)
        .await
        .map_err(|e| BindingError::invocation(method, e))?;
    Ok(StackReader::new(items))
}

/// Send a serialized message body.
pub async fn dispatch_message(
    runtime: &dyn ContractRuntime,
    address: &Address,
    message: &str,
    payload: Cell,
) -> Result<SendOutcome, BindingError> {
    debug!(%address, message, bits = payload.bit_len(), "dispatching message");
    runtime
        .send_message(address, payload)
        .await
        .map_err(|e| BindingError::send(message, e))
}
