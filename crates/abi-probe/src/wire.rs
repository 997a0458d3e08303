//! Get-method stack values and positional result reading.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

use ton_abi_schema::TypeCategory;

use crate::address::Address;
use crate::cell::Cell;

/// One entry of a get-method argument list or result stack.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Int(BigInt),
    Bool(bool),
    Address(Address),
    Cell(Cell),
    Slice(Cell),
    Text(String),
    /// Bytes the runtime could not classify.
    Opaque(Vec<u8>),
    Tuple(Vec<WireValue>),
}

impl WireValue {
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Int(_) => "int",
            WireValue::Bool(_) => "bool",
            WireValue::Address(_) => "address",
            WireValue::Cell(_) => "cell",
            WireValue::Slice(_) => "slice",
            WireValue::Text(_) => "text",
            WireValue::Opaque(_) => "opaque",
            WireValue::Tuple(_) => "tuple",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }
}

macro_rules! wire_int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for WireValue {
            fn from(value: $t) -> Self {
                WireValue::Int(BigInt::from(value))
            }
        })*
    };
}

wire_int_from!(u8, u16, u32, u64, i8, i16, i32, i64, BigUint);

impl From<BigInt> for WireValue {
    fn from(value: BigInt) -> Self {
        WireValue::Int(value)
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        WireValue::Bool(value)
    }
}

impl From<Address> for WireValue {
    fn from(value: Address) -> Self {
        WireValue::Address(value)
    }
}

impl From<Option<Address>> for WireValue {
    fn from(value: Option<Address>) -> Self {
        value.map_or(WireValue::Null, WireValue::Address)
    }
}

impl From<Cell> for WireValue {
    fn from(value: Cell) -> Self {
        WireValue::Cell(value)
    }
}

impl From<Option<Cell>> for WireValue {
    fn from(value: Option<Cell>) -> Self {
        value.map_or(WireValue::Null, WireValue::Cell)
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::Text(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("result stack ended at position {position}, expected {expected}")]
    Underflow {
        position: usize,
        expected: &'static str,
    },

    #[error("result item {position}: expected {expected}, found {found}")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("result item {position}: integer does not fit in {target}")]
    OutOfRange {
        position: usize,
        target: &'static str,
    },

    #[error("result item {position}: {reason}")]
    Malformed { position: usize, reason: String },
}

/// Reads result items front to back. Items left over after the declared
/// outputs are ignored.
#[derive(Debug, Clone)]
pub struct StackReader {
    items: std::vec::IntoIter<WireValue>,
    position: usize,
}

impl StackReader {
    pub fn new(items: Vec<WireValue>) -> Self {
        Self {
            items: items.into_iter(),
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn next(&mut self, expected: &'static str) -> Result<(usize, WireValue), StackError> {
        let position = self.position;
        let item = self
            .items
            .next()
            .ok_or(StackError::Underflow { position, expected })?;
        self.position += 1;
        Ok((position, item))
    }

    fn mismatch(position: usize, expected: &'static str, found: &WireValue) -> StackError {
        StackError::TypeMismatch {
            position,
            expected,
            found: found.kind(),
        }
    }

    pub fn read_any(&mut self) -> Result<WireValue, StackError> {
        Ok(self.next("any value")?.1)
    }

    pub fn read_int(&mut self) -> Result<BigInt, StackError> {
        match self.next("int")? {
            (_, WireValue::Int(v)) => Ok(v),
            (_, WireValue::Bool(b)) => Ok(if b { BigInt::from(-1) } else { BigInt::zero() }),
            (p, other) => Err(Self::mismatch(p, "int", &other)),
        }
    }

    pub fn read_biguint(&mut self) -> Result<BigUint, StackError> {
        let position = self.position;
        self.read_int()?
            .to_biguint()
            .ok_or(StackError::OutOfRange {
                position,
                target: "unsigned integer",
            })
    }

    pub fn read_u64(&mut self) -> Result<u64, StackError> {
        let position = self.position;
        self.read_int()?.to_u64().ok_or(StackError::OutOfRange {
            position,
            target: "u64",
        })
    }

    pub fn read_i64(&mut self) -> Result<i64, StackError> {
        let position = self.position;
        self.read_int()?.to_i64().ok_or(StackError::OutOfRange {
            position,
            target: "i64",
        })
    }

    /// Booleans come back from contracts as `0` / `-1`; any non-zero
    /// integer reads as `true`.
    pub fn read_bool(&mut self) -> Result<bool, StackError> {
        match self.next("bool")? {
            (_, WireValue::Bool(b)) => Ok(b),
            (_, WireValue::Int(v)) => Ok(v.sign() != Sign::NoSign),
            (p, other) => Err(Self::mismatch(p, "bool", &other)),
        }
    }

    /// A null entry or `addr_none` reads as `None`.
    pub fn read_address_opt(&mut self) -> Result<Option<Address>, StackError> {
        match self.next("address")? {
            (_, WireValue::Null) => Ok(None),
            (_, WireValue::Address(a)) => Ok(Some(a)),
            (p, WireValue::Slice(cell)) | (p, WireValue::Cell(cell)) => Address::from_cell(&cell)
                .map_err(|e| StackError::Malformed {
                    position: p,
                    reason: e.to_string(),
                }),
            (p, WireValue::Text(s)) => Address::parse(&s).map(Some).map_err(|e| {
                StackError::Malformed {
                    position: p,
                    reason: e.to_string(),
                }
            }),
            (p, other) => Err(Self::mismatch(p, "address", &other)),
        }
    }

    pub fn read_text(&mut self) -> Result<String, StackError> {
        match self.next("text")? {
            (_, WireValue::Text(s)) => Ok(s),
            (p, WireValue::Slice(cell)) | (p, WireValue::Cell(cell)) => {
                let malformed = |reason: &str| StackError::Malformed {
                    position: p,
                    reason: reason.to_string(),
                };
                let bytes = cell
                    .snake_bytes()
                    .ok_or_else(|| malformed("text cell is not byte-aligned"))?;
                String::from_utf8(bytes).map_err(|_| malformed("text is not valid UTF-8"))
            }
            (p, other) => Err(Self::mismatch(p, "text", &other)),
        }
    }

    pub fn read_cell(&mut self) -> Result<Cell, StackError> {
        match self.next("cell")? {
            (_, WireValue::Cell(c)) | (_, WireValue::Slice(c)) => Ok(c),
            (p, other) => Err(Self::mismatch(p, "cell", &other)),
        }
    }

    pub fn read_cell_opt(&mut self) -> Result<Option<Cell>, StackError> {
        match self.next("cell or null")? {
            (_, WireValue::Null) => Ok(None),
            (_, WireValue::Cell(c)) | (_, WireValue::Slice(c)) => Ok(Some(c)),
            (p, other) => Err(Self::mismatch(p, "cell or null", &other)),
        }
    }

    /// Read one item, checking it against a declared category. Used by
    /// interpreted bindings; the value is returned normalized.
    pub fn read_category(&mut self, category: &TypeCategory) -> Result<WireValue, StackError> {
        match category {
            TypeCategory::Integer { bits, signed } => {
                let position = self.position;
                let value = self.read_int()?;
                if !fits(&value, *bits, *signed) {
                    return Err(StackError::OutOfRange {
                        position,
                        target: if *signed { "signed integer" } else { "unsigned integer" },
                    });
                }
                Ok(WireValue::Int(value))
            }
            TypeCategory::VarUInt(_) => Ok(WireValue::from(self.read_biguint()?)),
            TypeCategory::Boolean => Ok(WireValue::Bool(self.read_bool()?)),
            TypeCategory::Address => Ok(WireValue::from(self.read_address_opt()?)),
            TypeCategory::Text => Ok(WireValue::Text(self.read_text()?)),
            TypeCategory::Cell | TypeCategory::Slice | TypeCategory::Builder => {
                Ok(WireValue::Cell(self.read_cell()?))
            }
            TypeCategory::Optional(_) => Ok(WireValue::from(self.read_cell_opt()?)),
            TypeCategory::Either(_, _) | TypeCategory::Unknown(_) => self.read_any(),
        }
    }
}

/// Whether `value` is representable in `bits` (two's complement if signed).
pub(crate) fn fits(value: &BigInt, bits: u16, signed: bool) -> bool {
    let bits = u64::from(bits);
    match (signed, value.sign()) {
        (false, Sign::Minus) => false,
        (false, _) => value.bits() <= bits,
        (true, Sign::Minus) => (-value - 1u8).bits() < bits,
        (true, _) => value.bits() < bits,
    }
}
