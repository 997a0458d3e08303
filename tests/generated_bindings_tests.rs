//! Bindings generated by the build script from `tests/fixtures`, compiled
//! and driven against the in-memory runtime.

mod common;

use std::sync::Arc;

use common::{nft_data_stack, MockRuntime};
use ton_abi_probe::num_bigint::BigUint;
use ton_abi_probe::{Address, BindingRegistry, Cell, CellError, Prober, Verdict};

#[allow(dead_code, unused_imports)]
mod nft {
    include!(concat!(env!("OUT_DIR"), "/nft_bindings.rs"));
}

#[allow(dead_code, unused_imports)]
mod reserved_names {
    include!(concat!(env!("OUT_DIR"), "/reserved_names_bindings.rs"));
}

fn owner() -> Address {
    Address::parse("EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N").unwrap()
}

fn transfer() -> nft::messages::Transfer {
    nft::messages::Transfer {
        query_id: 9,
        new_owner: owner(),
        response_destination: Address::zero(),
        custom_payload: Some(Cell::empty()),
        forward_amount: BigUint::from(1_000_000u64),
        forward_payload: Cell::empty(),
    }
}

#[tokio::test]
async fn test_generated_query_reads_record() {
    let address = owner();
    let runtime = Arc::new(MockRuntime::new().with_method(
        address,
        "get_nft_data",
        nft_data_stack(owner()),
    ));
    let item = nft::NftItem::new(address, runtime.clone());
    assert_eq!(nft::NftItem::INTERFACE, "nft_item");

    let data = item.get_nft_data().await.unwrap();
    assert_eq!(
        data,
        nft::nft_item::GetNftDataResult {
            init: true,
            index: 42,
            collection_address: Some(Address::zero()),
            owner_address: Some(owner()),
            individual_content: Cell::empty(),
        }
    );
    assert_eq!(runtime.calls(), vec!["get_nft_data"]);
}

#[tokio::test]
async fn test_generated_send_writes_message_body() {
    let address = owner();
    let runtime = Arc::new(MockRuntime::new());
    let item = nft::NftItemSimple::new(address, runtime.clone());
    let body = transfer();

    let outcome = item
        .send_nft_transfer(
            body.query_id,
            body.new_owner,
            body.response_destination,
            body.custom_payload.clone(),
            body.forward_amount.clone(),
            body.forward_payload.clone(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.transactions.len(), 1);

    let sent = runtime.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, body.to_cell().unwrap());
}

#[test]
fn test_message_body_reads_back() {
    let body = transfer();
    let cell = body.to_cell().unwrap();
    assert_eq!(nft::messages::Transfer::from_cell(&cell).unwrap(), body);

    let excesses = nft::messages::Excesses { query_id: 3 }.to_cell().unwrap();
    assert_eq!(
        nft::messages::Transfer::from_cell(&excesses).unwrap_err(),
        CellError::OpcodeMismatch {
            expected: 0x5fcc3d14,
            found: 0xd53276db,
        }
    );
    assert_eq!(
        nft::messages::Excesses::from_cell(&excesses).unwrap(),
        nft::messages::Excesses { query_id: 3 }
    );
}

#[tokio::test]
async fn test_registered_bindings_detect_item_simple() {
    let mut registry = BindingRegistry::new();
    nft::register_all(&mut registry);
    let names: Vec<_> = registry.interfaces().collect();
    assert_eq!(
        names,
        vec!["nft_royalty", "nft_item_simple", "nft_item", "nft_collection"]
    );

    let address = owner();
    let runtime = Arc::new(MockRuntime::new().with_method(
        address,
        "get_nft_data",
        nft_data_stack(owner()),
    ));
    let prober = Prober::new(registry, runtime.clone());
    let found = prober.detect(address).await.unwrap();
    assert_eq!(found.report.interface, "nft_item_simple");
    assert_eq!(found.report.verdict, Verdict::Implemented);
    assert_eq!(runtime.calls(), vec!["royalty_params", "get_nft_data"]);
    assert_eq!(runtime.sent().len(), 2);
}

#[test]
fn test_colliding_names_are_suffixed() {
    assert_eq!(reserved_names::Cell_2::INTERFACE, "cell");
    assert_eq!(reserved_names::WireValue_2::INTERFACE, "wire_value");
    assert_eq!(reserved_names::Result_2::INTERFACE, "result");
    assert_eq!(reserved_names::messages::Cell_2::OPCODE, 0xbeef);

    let body = reserved_names::messages::Cell_2 {
        value: 7,
        target: owner(),
    };
    let cell = body.to_cell().unwrap();
    assert_eq!(cell.bit_len(), 32 + 32 + Address::BIT_LEN);
    assert_eq!(reserved_names::messages::Cell_2::from_cell(&cell).unwrap(), body);
}

#[tokio::test]
async fn test_colliding_names_still_call_through() {
    let address = owner();
    let runtime = Arc::new(MockRuntime::new().with_method(
        address,
        "get_wire_value",
        vec![
            ton_abi_probe::WireValue::from(5u32),
            ton_abi_probe::WireValue::Cell(Cell::empty()),
        ],
    ));
    let derived = reserved_names::WireValue_2::new(address, runtime.clone());

    let result = derived.get_wire_value().await.unwrap();
    assert_eq!(result.value, 5);
    assert_eq!(result.cell, Cell::empty());

    derived.send_address(7, owner()).await.unwrap();
    let expected = reserved_names::messages::Cell_2 {
        value: 7,
        target: owner(),
    };
    assert_eq!(runtime.sent()[0].1, expected.to_cell().unwrap());

    let mut registry = BindingRegistry::new();
    reserved_names::register_all(&mut registry);
    let report = Prober::new(registry, runtime)
        .check(address, "wire_value")
        .await
        .unwrap();
    assert_eq!(report.verdict, Verdict::Implemented);
}
