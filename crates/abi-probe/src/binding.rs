//! Bindings interpreted from the binding model at runtime.
//!
//! A [`ContractBinding`] does what a generated binding struct does, driven
//! by a [`BindingClass`] instead of compiled code. Arguments and results are
//! [`WireValue`]s checked against the declared categories.

use std::sync::Arc;

use ton_abi_codegen::{BindingClass, DefaultValue, Field, MessageField, SendRecipe, StoreOp};
use ton_abi_schema::TypeCategory;

use crate::address::Address;
use crate::cell::{Cell, CellBuilder, CellError};
use crate::error::{BindingError, ProbeFailure};
use crate::runtime::{dispatch_message, invoke_query, ContractRuntime, SendOutcome};
use crate::target::ConformanceTarget;
use crate::wire::{fits, WireValue};

/// Stack or field value synthesized for a probe call.
pub fn default_wire_value(default: DefaultValue) -> WireValue {
    match default {
        DefaultValue::Zero => WireValue::from(0u8),
        DefaultValue::False => WireValue::Bool(false),
        DefaultValue::EmptyText => WireValue::Text(String::new()),
        DefaultValue::NullAddress | DefaultValue::Absent | DefaultValue::Null => WireValue::Null,
        DefaultValue::ZeroAddress => WireValue::Address(Address::zero()),
        DefaultValue::EmptyCell => WireValue::Cell(Cell::empty()),
    }
}

#[derive(Clone)]
pub struct ContractBinding {
    class: Arc<BindingClass>,
    address: Address,
    runtime: Arc<dyn ContractRuntime>,
}

impl ContractBinding {
    pub fn new(class: Arc<BindingClass>, address: Address, runtime: Arc<dyn ContractRuntime>) -> Self {
        Self {
            class,
            address,
            runtime,
        }
    }

    pub fn class(&self) -> &BindingClass {
        &self.class
    }

    fn unknown_member(&self, member: &str) -> BindingError {
        BindingError::UnknownMember {
            interface: self.class.interface.clone(),
            member: member.to_string(),
        }
    }

    /// Run a get-method and return its declared outputs in order.
    pub async fn query(
        &self,
        method: &str,
        args: Vec<WireValue>,
    ) -> Result<Vec<WireValue>, BindingError> {
        let recipe = self
            .class
            .query(method)
            .ok_or_else(|| self.unknown_member(method))?;
        if args.len() != recipe.inputs.len() {
            return Err(BindingError::Arity {
                member: method.to_string(),
                expected: recipe.inputs.len(),
                found: args.len(),
            });
        }
        for (field, arg) in recipe.inputs.iter().zip(&args) {
            check_input(method, field, arg)?;
        }

        let mut stack = invoke_query(self.runtime.as_ref(), &self.address, method, args).await?;
        recipe
            .result
            .fields()
            .iter()
            .map(|field| {
                stack
                    .read_category(&field.category)
                    .map_err(|e| BindingError::shape(method, e))
            })
            .collect()
    }

    /// Serialize a message body: opcode, then each field per its store op.
    pub fn build_payload(&self, message: &str, args: &[WireValue]) -> Result<Cell, BindingError> {
        let recipe = self
            .class
            .send(message)
            .ok_or_else(|| self.unknown_member(message))?;
        encode_body(recipe, args)
    }

    pub async fn send(&self, message: &str, args: &[WireValue]) -> Result<SendOutcome, BindingError> {
        let payload = self.build_payload(message, args)?;
        dispatch_message(self.runtime.as_ref(), &self.address, message, payload).await
    }

    pub async fn probe_query(&self, method: &str) -> Result<(), ProbeFailure> {
        let recipe = self
            .class
            .query(method)
            .ok_or_else(|| self.unknown_member(method))?;
        let args = recipe
            .inputs
            .iter()
            .map(|f| default_wire_value(f.default))
            .collect();
        self.query(method, args).await?;
        Ok(())
    }

    pub async fn probe_send(&self, message: &str) -> Result<(), ProbeFailure> {
        let recipe = self
            .class
            .send(message)
            .ok_or_else(|| self.unknown_member(message))?;
        let args: Vec<WireValue> = recipe
            .fields
            .iter()
            .map(|f| default_wire_value(f.field.default))
            .collect();
        self.send(message, &args).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConformanceTarget for ContractBinding {
    fn interface_name(&self) -> &str {
        &self.class.interface
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn query_probes(&self) -> Vec<&str> {
        self.class.queries.iter().map(|q| q.method.as_str()).collect()
    }

    fn send_probes(&self) -> Vec<&str> {
        self.class.sends.iter().map(|s| s.message.as_str()).collect()
    }

    async fn run_query_probe(&self, method: &str) -> Result<(), ProbeFailure> {
        self.probe_query(method).await
    }

    async fn run_send_probe(&self, message: &str) -> Result<(), ProbeFailure> {
        self.probe_send(message).await
    }
}

/// Reject a get-method argument whose wire kind cannot carry `field`'s
/// category. Either-typed and unknown inputs take any value.
fn check_input(method: &str, field: &Field, arg: &WireValue) -> Result<(), BindingError> {
    let expected = match (&field.category, arg) {
        (TypeCategory::Integer { bits, signed }, WireValue::Int(v)) => {
            if fits(v, *bits, *signed) {
                return Ok(());
            }
            if *signed {
                "signed integer"
            } else {
                "unsigned integer"
            }
        }
        (TypeCategory::Integer { signed: true, .. }, _) => "signed integer",
        (TypeCategory::Integer { signed: false, .. }, _) => "unsigned integer",
        (TypeCategory::VarUInt(_), WireValue::Int(v)) if v.sign() != num_bigint::Sign::Minus => {
            return Ok(())
        }
        (TypeCategory::VarUInt(_), _) => "unsigned integer",
        (TypeCategory::Boolean, WireValue::Bool(_) | WireValue::Int(_)) => return Ok(()),
        (TypeCategory::Boolean, _) => "bool",
        (
            TypeCategory::Address,
            WireValue::Address(_) | WireValue::Null | WireValue::Slice(_),
        ) => return Ok(()),
        (TypeCategory::Address, _) => "address or null",
        (TypeCategory::Text, WireValue::Text(_) | WireValue::Cell(_) | WireValue::Slice(_)) => {
            return Ok(())
        }
        (TypeCategory::Text, _) => "text",
        (
            TypeCategory::Cell | TypeCategory::Slice | TypeCategory::Builder,
            WireValue::Cell(_) | WireValue::Slice(_),
        ) => return Ok(()),
        (TypeCategory::Cell | TypeCategory::Slice | TypeCategory::Builder, _) => "cell",
        (TypeCategory::Optional(_), WireValue::Cell(_) | WireValue::Slice(_) | WireValue::Null) => {
            return Ok(())
        }
        (TypeCategory::Optional(_), _) => "cell or null",
        (TypeCategory::Either(_, _) | TypeCategory::Unknown(_), _) => return Ok(()),
    };
    Err(BindingError::Argument {
        member: method.to_string(),
        name: field.name.clone(),
        expected,
        found: arg.kind(),
    })
}

fn encode_body(recipe: &SendRecipe, args: &[WireValue]) -> Result<Cell, BindingError> {
    if args.len() != recipe.fields.len() {
        return Err(BindingError::Arity {
            member: recipe.message.clone(),
            expected: recipe.fields.len(),
            found: args.len(),
        });
    }

    let mut builder = CellBuilder::new();
    builder
        .store_u64(recipe.opcode.value(), recipe.opcode.bit_width())
        .map_err(|e| BindingError::payload(&recipe.message, e))?;
    for (field, arg) in recipe.fields.iter().zip(args) {
        store_field(&mut builder, &recipe.message, field, arg)?;
    }
    Ok(builder.build())
}

fn store_field(
    builder: &mut CellBuilder,
    message: &str,
    field: &MessageField,
    arg: &WireValue,
) -> Result<(), BindingError> {
    let mismatch = |expected: &'static str| BindingError::Argument {
        member: message.to_string(),
        name: field.field.name.clone(),
        expected,
        found: arg.kind(),
    };

    let stored: Result<&mut CellBuilder, CellError> = match (field.op, arg) {
        (StoreOp::Uint { bits }, WireValue::Int(v)) => {
            let v = v.to_biguint().ok_or_else(|| mismatch("unsigned integer"))?;
            builder.store_uint(&v, bits)
        }
        (StoreOp::Int { bits }, WireValue::Int(v)) => builder.store_int(v, bits),
        (StoreOp::VarUInt { bound }, WireValue::Int(v)) => {
            let v = v.to_biguint().ok_or_else(|| mismatch("unsigned integer"))?;
            builder.store_var_uint(&v, bound)
        }
        (StoreOp::Bit, WireValue::Bool(b)) => builder.store_bit(*b),
        (StoreOp::Address, WireValue::Address(a)) => builder.store_address(Some(a)),
        (StoreOp::Address, WireValue::Null) => builder.store_address(None),
        (StoreOp::Address, WireValue::Text(s)) => {
            let a = Address::parse(s).map_err(|_| mismatch("address"))?;
            builder.store_address(Some(&a))
        }
        (StoreOp::MaybeRef, WireValue::Null) => builder.store_maybe_ref(None),
        (StoreOp::MaybeRef, WireValue::Cell(c) | WireValue::Slice(c)) => {
            builder.store_maybe_ref(Some(c))
        }
        (StoreOp::Text, WireValue::Text(s)) => builder.store_text(s),
        (StoreOp::Ref, WireValue::Cell(c) | WireValue::Slice(c)) => builder.store_ref(c),
        (op, _) => return Err(mismatch(expected_kind(op))),
    };
    stored.map_err(|e| BindingError::payload(message, e))?;
    Ok(())
}

fn expected_kind(op: StoreOp) -> &'static str {
    match op {
        StoreOp::Uint { .. } | StoreOp::VarUInt { .. } => "unsigned integer",
        StoreOp::Int { .. } => "integer",
        StoreOp::Bit => "bool",
        StoreOp::Address => "address",
        StoreOp::MaybeRef => "cell or null",
        StoreOp::Text => "text",
        StoreOp::Ref => "cell",
    }
}
