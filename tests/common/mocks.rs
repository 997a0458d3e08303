//! In-memory contract runtime.

use std::collections::HashMap;
use std::sync::Mutex;

use ton_abi_probe::{
    Address, Cell, InvocationError, MessageSender, MethodInvoker, SendOutcome, TransactionInfo,
    WireValue,
};

/// Per-address get-method answers. Unknown methods fail with exit code 11,
/// like a contract without that method.
#[derive(Default)]
pub struct MockRuntime {
    contracts: HashMap<Address, HashMap<String, Vec<WireValue>>>,
    reject_sends: bool,
    calls: Mutex<Vec<(Address, String)>>,
    sent: Mutex<Vec<(Address, Cell)>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, address: Address, method: &str, stack: Vec<WireValue>) -> Self {
        self.contracts
            .entry(address)
            .or_default()
            .insert(method.to_string(), stack);
        self
    }

    /// Every send bounces with exit code 4.
    pub fn rejecting_sends(mut self) -> Self {
        self.reject_sends = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn sent(&self) -> Vec<(Address, Cell)> {
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
        self.calls
            .lock()
            .unwrap()
            .push((*address, method.to_string()));
        self.contracts
            .get(address)
            .and_then(|methods| methods.get(method))
            .cloned()
            .ok_or_else(|| InvocationError::from_exit_code(11, format!("no method {}", method)))
    }
}

#[async_trait::async_trait]
impl MessageSender for MockRuntime {
    async fn send_message(
        &self,
        address: &Address,
        payload: Cell,
    ) -> Result<SendOutcome, InvocationError> {
        if self.reject_sends {
            return Err(InvocationError::from_exit_code(4, "message bounced"));
        }
        let hash = payload.hash_hex();
        self.sent.lock().unwrap().push((*address, payload));
        Ok(SendOutcome {
            transactions: vec![TransactionInfo {
                hash,
                success: true,
                exit_code: Some(0),
            }],
        })
    }
}

/// A valid `get_nft_data` result.
pub fn nft_data_stack(owner: Address) -> Vec<WireValue> {
    vec![
        WireValue::from(-1i64),
        WireValue::from(42u64),
        WireValue::Address(Address::zero()),
        WireValue::Address(owner),
        WireValue::Cell(Cell::empty()),
    ]
}
