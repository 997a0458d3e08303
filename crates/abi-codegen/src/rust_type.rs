//! Per-category decisions: Rust type, probe default and store operation.

use ton_abi_schema::TypeCategory;

use crate::model::{DefaultValue, StoreOp};

/// Where a value appears. Addresses and opaque types are represented
/// differently on the query stack than inside a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    QueryInput,
    QueryOutput,
    MessageField,
}

/// Widest integer that maps onto a native Rust integer.
pub const NATIVE_INT_BITS: u16 = 64;

pub fn rust_type(category: &TypeCategory, position: Position) -> String {
    let ty = match category {
        TypeCategory::Integer { bits, signed } => match (*bits <= NATIVE_INT_BITS, signed) {
            (true, false) => "u64",
            (true, true) => "i64",
            (false, false) => "BigUint",
            (false, true) => "BigInt",
        },
        TypeCategory::VarUInt(_) => "BigUint",
        TypeCategory::Boolean => "bool",
        TypeCategory::Address => match position {
            Position::MessageField => "Address",
            Position::QueryInput | Position::QueryOutput => "Option<Address>",
        },
        TypeCategory::Text => "String",
        TypeCategory::Cell | TypeCategory::Slice | TypeCategory::Builder => "Cell",
        TypeCategory::Optional(_) => "Option<Cell>",
        TypeCategory::Either(_, _) | TypeCategory::Unknown(_) => match position {
            Position::MessageField => "Cell",
            Position::QueryInput | Position::QueryOutput => "WireValue",
        },
    };
    ty.to_string()
}

pub fn default_value(category: &TypeCategory, position: Position) -> DefaultValue {
    match category {
        TypeCategory::Integer { .. } | TypeCategory::VarUInt(_) => DefaultValue::Zero,
        TypeCategory::Boolean => DefaultValue::False,
        TypeCategory::Text => DefaultValue::EmptyText,
        TypeCategory::Address => match position {
            Position::MessageField => DefaultValue::ZeroAddress,
            _ => DefaultValue::NullAddress,
        },
        TypeCategory::Optional(_) => DefaultValue::Absent,
        TypeCategory::Cell | TypeCategory::Slice | TypeCategory::Builder => DefaultValue::EmptyCell,
        TypeCategory::Either(_, _) => DefaultValue::EmptyCell,
        TypeCategory::Unknown(_) => match position {
            // A message body still needs some cell to reference.
            Position::MessageField => DefaultValue::EmptyCell,
            _ => DefaultValue::Null,
        },
    }
}

pub fn store_op(category: &TypeCategory) -> StoreOp {
    match category {
        TypeCategory::Integer { bits, signed: false } => StoreOp::Uint { bits: *bits },
        TypeCategory::Integer { bits, signed: true } => StoreOp::Int { bits: *bits },
        TypeCategory::Boolean => StoreOp::Bit,
        TypeCategory::Address => StoreOp::Address,
        TypeCategory::Optional(_) => StoreOp::MaybeRef,
        TypeCategory::VarUInt(bound) => StoreOp::VarUInt { bound: *bound },
        TypeCategory::Text => StoreOp::Text,
        TypeCategory::Cell
        | TypeCategory::Slice
        | TypeCategory::Builder
        | TypeCategory::Either(_, _)
        | TypeCategory::Unknown(_) => StoreOp::Ref,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_abi_schema::map_type;

    #[test]
    fn test_integer_widths() {
        assert_eq!(rust_type(&map_type("uint64"), Position::MessageField), "u64");
        assert_eq!(rust_type(&map_type("int8"), Position::QueryOutput), "i64");
        assert_eq!(rust_type(&map_type("uint256"), Position::QueryOutput), "BigUint");
        assert_eq!(rust_type(&map_type("int257"), Position::QueryInput), "BigInt");
        assert_eq!(rust_type(&map_type("(VarUInteger 16)"), Position::MessageField), "BigUint");
    }

    #[test]
    fn test_position_dependent_types() {
        let addr = map_type("MsgAddress");
        assert_eq!(rust_type(&addr, Position::MessageField), "Address");
        assert_eq!(rust_type(&addr, Position::QueryOutput), "Option<Address>");
        let either = map_type("(Either Cell ^Cell)");
        assert_eq!(rust_type(&either, Position::MessageField), "Cell");
        assert_eq!(rust_type(&either, Position::QueryOutput), "WireValue");
        assert_eq!(rust_type(&map_type("(Maybe ^Cell)"), Position::MessageField), "Option<Cell>");
    }

    #[test]
    fn test_defaults() {
        let addr = map_type("msgaddress");
        assert_eq!(default_value(&addr, Position::QueryInput), DefaultValue::NullAddress);
        assert_eq!(default_value(&addr, Position::MessageField), DefaultValue::ZeroAddress);
        assert_eq!(default_value(&map_type("FullContent"), Position::QueryInput), DefaultValue::Null);
        assert_eq!(default_value(&map_type("^Cell"), Position::QueryInput), DefaultValue::EmptyCell);
        assert_eq!(default_value(&map_type("text"), Position::QueryInput), DefaultValue::EmptyText);
    }

    #[test]
    fn test_store_ops() {
        assert_eq!(store_op(&map_type("uint64")), StoreOp::Uint { bits: 64 });
        assert_eq!(store_op(&map_type("(Maybe ^Cell)")), StoreOp::MaybeRef);
        assert_eq!(store_op(&map_type("(VarUInteger 16)")), StoreOp::VarUInt { bound: 16 });
        assert_eq!(store_op(&map_type("(Either Cell ^Cell)")), StoreOp::Ref);
        assert_eq!(store_op(&map_type("Whatever")), StoreOp::Ref);
    }
}
