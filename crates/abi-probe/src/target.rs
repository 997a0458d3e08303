use crate::address::Address;
use crate::error::ProbeFailure;

/// Something the prober can check against one interface: a generated
/// binding struct or an interpreted [`ContractBinding`](crate::ContractBinding).
///
/// Probe names are the get-method and message names from the schema, listed
/// in own-then-inherited order.
#[async_trait::async_trait]
pub trait ConformanceTarget: Send + Sync {
    fn interface_name(&self) -> &str;

    fn address(&self) -> &Address;

    fn query_probes(&self) -> Vec<&str>;

    fn send_probes(&self) -> Vec<&str>;

    /// Call the get-method with default arguments and check the result shape.
    async fn run_query_probe(&self, method: &str) -> Result<(), ProbeFailure>;

    /// Dispatch the message with default fields. Success only means a result
    /// handle came back.
    async fn run_send_probe(&self, message: &str) -> Result<(), ProbeFailure>;
}
