//! TON ABI Probe
//!
//! Runtime side of the generated bindings:
//!
//! - [`cell`], [`address`]: the serialization primitives message bodies are
//!   written with
//! - [`wire`]: get-method stack values and positional readers
//! - [`runtime`]: the [`MethodInvoker`] and [`MessageSender`] capabilities a
//!   host supplies
//! - [`binding`]: bindings interpreted from a [`ton_abi_codegen::BindingModel`]
//! - [`registry`], [`prober`]: interface lookup by name and conformance
//!   detection
//!
//! Generated code only depends on names re-exported here.

pub mod address;
pub mod binding;
pub mod cell;
pub mod error;
pub mod prober;
pub mod registry;
pub mod runtime;
pub mod target;
pub mod wire;

#[cfg(test)]
mod testing;

pub use async_trait::async_trait;
pub use num_bigint;

pub use address::{Address, AddressError};
pub use binding::{default_wire_value, ContractBinding};
pub use cell::{Cell, CellBuilder, CellError, CellSlice};
pub use error::{BindingError, ProbeFailure};
pub use prober::{
    probe, ConformanceReport, Detection, ProbeOutcome, ProbeRecord, Prober, Verdict,
};
pub use registry::BindingRegistry;
pub use runtime::{
    dispatch_message, invoke_query, ContractRuntime, InvocationError, InvocationErrorKind,
    MessageSender, MethodInvoker, SendOutcome, TransactionInfo,
};
pub use target::ConformanceTarget;
pub use wire::{StackError, StackReader, WireValue};
