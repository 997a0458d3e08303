//! End-to-end: schema text through resolution, emission and probing.

mod common;

use std::sync::Arc;

use common::{nft_data_stack, nft_generation, MockRuntime};
use ton_abi_bindgen::generate;
use ton_abi_probe::{Address, ContractBinding, Prober, Verdict, WireValue};
use ton_abi_schema::{parse_message_text, SchemaWarning};

fn owner() -> Address {
    Address::parse("EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N").unwrap()
}

#[test]
fn test_transfer_message_parses_exactly() {
    let def = parse_message_text(
        "transfer#5fcc3d14 query_id:uint64 new_owner:MsgAddress response_destination:MsgAddress \
         custom_payload:(Maybe ^Cell) forward_amount:(VarUInteger 16) \
         forward_payload:(Either Cell ^Cell) = InternalMsgBody;",
    )
    .unwrap();
    assert_eq!(def.definition_name, "transfer");
    assert_eq!(def.opcode.value(), 0x5fcc3d14);
    let params: Vec<_> = def
        .params
        .iter()
        .map(|p| format!("{}:{}", p.name, p.raw_type))
        .collect();
    assert_eq!(
        params,
        vec![
            "query_id:uint64",
            "new_owner:MsgAddress",
            "response_destination:MsgAddress",
            "custom_payload:(Maybe ^Cell)",
            "forward_amount:(VarUInteger 16)",
            "forward_payload:(Either Cell ^Cell)",
        ]
    );
    assert_eq!(def.return_type, "InternalMsgBody");
}

#[test]
fn test_item_simple_inherits_item_members() {
    let generation = nft_generation();
    let graph = &generation.graph;
    assert_eq!(
        graph.effective_members("nft_item_simple"),
        graph.effective_members("nft_item")
    );
    assert_eq!(
        graph.reverse_topo_order(),
        vec!["nft_royalty", "nft_item_simple", "nft_item", "nft_collection"]
    );
    assert!(generation.warnings.iter().any(|w| matches!(
        w,
        SchemaWarning::MalformedMessage { name, .. } if name == "broken"
    )));
}

#[test]
fn test_emitted_files() {
    let generation = nft_generation();
    let emitted = &generation.emitted;
    let names: Vec<_> = emitted.files().iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec![
            "nft_collection.rs",
            "nft_item.rs",
            "nft_item_simple.rs",
            "nft_royalty.rs",
            "messages.rs",
            "registry.rs",
            "mod.rs"
        ]
    );

    let simple = emitted.binding_source("nft_item_simple").unwrap();
    assert!(simple.contains("//! Inherits: nft_item"));
    assert!(simple.contains("pub async fn get_nft_data(&self) -> Result<GetNftDataResult, BindingError> {"));
    assert!(simple.contains("\"nft_transfer\" => self.probe_send_nft_transfer().await,"));

    let collection = emitted.binding_source("nft_collection").unwrap();
    assert!(collection.contains(
        "pub async fn get_nft_address_by_index(&self, index: u64) -> Result<Option<Address>, BindingError> {"
    ));
    assert!(collection.contains("self.probe_get_nft_address_by_index_with(0).await"));

    assert!(emitted.data_types.contains("pub struct Transfer {"));
    assert!(emitted.data_types.contains("pub const OPCODE: u64 = 0x5fcc3d14;"));
    let simple_reg = emitted.registry.find("\"nft_item_simple\"").unwrap();
    let item_reg = emitted.registry.find("\"nft_item\"").unwrap();
    assert!(simple_reg < item_reg);
}

#[tokio::test]
async fn test_detection_prefers_item_simple() {
    let generation = nft_generation();
    let address = owner();
    let runtime = Arc::new(MockRuntime::new().with_method(
        address,
        "get_nft_data",
        nft_data_stack(owner()),
    ));
    let prober = Prober::new(generation.registry(), runtime.clone());

    let found = prober.detect(address).await.unwrap();
    assert_eq!(found.report.interface, "nft_item_simple");
    assert_eq!(found.report.verdict, Verdict::Implemented);
    assert_eq!(found.report.sends.len(), 2);
    assert!(found.report.sends.iter().all(|s| s.passed()));

    // nft_royalty fails first, then nft_item_simple passes; nft_item never runs.
    assert_eq!(runtime.calls(), vec!["royalty_params", "get_nft_data"]);
    let sent = runtime.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1.read_u64(0, 32), Some(0x5fcc3d14));
    assert_eq!(sent[1].1.read_u64(0, 32), Some(0x2fcb26a2));
}

#[tokio::test]
async fn test_bounced_sends_do_not_change_verdict() {
    let generation = nft_generation();
    let address = owner();
    let runtime = Arc::new(
        MockRuntime::new()
            .with_method(address, "get_nft_data", nft_data_stack(owner()))
            .rejecting_sends(),
    );
    let prober = Prober::new(generation.registry(), runtime);
    let report = prober.check(address, "nft_item").await.unwrap();
    assert_eq!(report.verdict, Verdict::Implemented);
    assert!(report.sends.iter().all(|s| !s.passed()));
}

#[tokio::test]
async fn test_unknown_contract_matches_nothing() {
    let generation = nft_generation();
    let prober = Prober::new(generation.registry(), Arc::new(MockRuntime::new()));
    assert!(prober.detect(Address::zero()).await.is_none());
    assert!(prober.detect_concurrent(Address::zero()).await.is_none());

    let reports = prober.survey(Address::zero()).await;
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.verdict == Verdict::NotImplemented));
    assert!(reports.iter().all(|r| r.queries.len() == 1));
}

#[tokio::test]
async fn test_shape_mismatch_fails_query_phase() {
    let generation = nft_generation();
    let address = owner();
    // Too few items for get_nft_data.
    let runtime = Arc::new(MockRuntime::new().with_method(
        address,
        "get_nft_data",
        vec![WireValue::from(-1i64)],
    ));
    let prober = Prober::new(generation.registry(), runtime);
    let report = prober.check(address, "nft_item").await.unwrap();
    assert_eq!(report.verdict, Verdict::NotImplemented);
    assert!(report.failure.unwrap().contains("get_nft_data"));
}

#[tokio::test]
async fn test_interpreted_binding_reads_typed_results() {
    let generation = generate(&common::nft_schema()).unwrap();
    let model = ton_abi_codegen::build_model(&generation.document, &generation.graph);
    let class = Arc::new(model.class("nft_collection").unwrap().clone());
    let address = owner();
    let runtime = Arc::new(MockRuntime::new().with_method(
        address,
        "get_nft_address_by_index",
        vec![WireValue::Address(owner())],
    ));
    let collection = ContractBinding::new(class, address, runtime);
    let out = collection
        .query("get_nft_address_by_index", vec![WireValue::from(3u64)])
        .await
        .unwrap();
    assert_eq!(out, vec![WireValue::Address(owner())]);
}

#[test]
fn test_empty_interfaces_still_emit() {
    let generation = generate(r#"<abi><interface name="marker"/></abi>"#).unwrap();
    let src = generation.emitted.binding_source("marker").unwrap();
    assert!(src.contains("fn query_probes(&self) -> Vec<&str> {"));
    assert!(src.contains("vec![]"));
}
