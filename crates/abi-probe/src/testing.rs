//! In-memory runtime for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use ton_abi_codegen::{build_model, BindingModel};
use ton_abi_resolver::resolve;
use ton_abi_schema::parse_schema;

use crate::address::Address;
use crate::cell::Cell;
use crate::runtime::{InvocationError, MessageSender, MethodInvoker, SendOutcome, TransactionInfo};
use crate::wire::WireValue;

pub const SCHEMA: &str = r#"<abi>
  <interface name="nft_item">
    <get_method name="get_nft_data"/>
    <msg_in><internal name="nft_transfer"/></msg_in>
  </interface>
  <interface name="nft_item_editable" inherits="nft_item">
    <get_method name="get_editor"/>
  </interface>
  <interface name="wallet">
    <get_method name="seqno"/>
  </interface>
  <get_method name="get_nft_data">
    <output>
      <int name="init">bool</int>
      <int name="index">uint64</int>
      <slice name="collection_address">msgaddress</slice>
      <slice name="owner_address">msgaddress</slice>
      <cell name="individual_content">Cell</cell>
    </output>
  </get_method>
  <get_method name="get_editor">
    <output><slice name="editor">msgaddress</slice></output>
  </get_method>
  <get_method name="seqno">
    <output><int name="seqno">uint32</int></output>
  </get_method>
  <internal name="nft_transfer">transfer#5fcc3d14 query_id:uint64 new_owner:MsgAddress response_destination:MsgAddress custom_payload:(Maybe ^Cell) forward_amount:(VarUInteger 16) forward_payload:(Either Cell ^Cell) = InternalMsgBody;</internal>
</abi>"#;

pub fn model(xml: &str) -> BindingModel {
    let doc = parse_schema(xml).unwrap().document;
    build_model(&doc, &resolve(&doc))
}

/// Answers configured get-methods, fails the rest with exit code 11, and
/// records every call.
#[derive(Default)]
pub struct MockRuntime {
    queries: HashMap<String, Vec<WireValue>>,
    failing_sends: bool,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<Cell>>,
    unreachable: HashSet<Address>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, method: &str, stack: Vec<WireValue>) -> Self {
        self.queries.insert(method.to_string(), stack);
        self
    }

    pub fn with_failing_sends(mut self) -> Self {
        self.failing_sends = true;
        self
    }

    pub fn with_unreachable(mut self, address: Address) -> Self {
        self.unreachable.insert(address);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Cell> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MethodInvoker for MockRuntime {
    async fn invoke_query(
        &self,
        address: &Address,
        method: &str,
        _args: Vec<WireValue>,
    ) -> Result<Vec<WireValue>, InvocationError> {
        self.calls.lock().unwrap().push(method.to_string());
        if self.unreachable.contains(address) {
            return Err(InvocationError::from_exit_code(2, "no response"));
        }
        self.queries
            .get(method)
            .cloned()
            .ok_or_else(|| InvocationError::from_exit_code(11, format!("unknown method {}", method)))
    }
}

#[async_trait::async_trait]
impl MessageSender for MockRuntime {
    async fn send_message(
        &self,
        _address: &Address,
        payload: Cell,
    ) -> Result<SendOutcome, InvocationError> {
        if self.failing_sends {
            return Err(InvocationError::from_exit_code(4, "bounced"));
        }
        let hash = payload.hash_hex();
        self.sent.lock().unwrap().push(payload);
        Ok(SendOutcome {
            transactions: vec![TransactionInfo {
                hash,
                success: true,
                exit_code: Some(0),
            }],
        })
    }
}

pub fn nft_data_stack() -> Vec<WireValue> {
    vec![
        WireValue::from(-1i64),
        WireValue::from(7u64),
        WireValue::Address(Address::zero()),
        WireValue::Null,
        WireValue::Cell(Cell::empty()),
    ]
}
