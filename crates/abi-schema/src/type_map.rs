//! Mapping from raw schema type tokens to semantic categories.
//!
//! Mapping is total: a token the mapper does not recognize becomes
//! [`TypeCategory::Unknown`] carrying the raw token, which downstream code
//! serializes as an opaque cell reference.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Parameter;

/// Default byte bound for `(VarUInteger n)` when `n` cannot be parsed.
pub const DEFAULT_VAR_UINT_BYTES: u16 = 16;

/// Width used for get-method parameters declared as `int` without a type.
pub const DEFAULT_INT_BITS: u16 = 257;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeCategory {
    Integer { bits: u16, signed: bool },
    Boolean,
    Address,
    Cell,
    Slice,
    Builder,
    Text,
    /// `(Maybe X)`
    Optional(Box<TypeCategory>),
    Either(Box<TypeCategory>, Box<TypeCategory>),
    /// `(VarUInteger n)`, `n` being the exclusive upper bound on the byte length.
    VarUInt(u16),
    Unknown(String),
}

impl TypeCategory {
    /// Cells, slices, builders and every constructor that serializes as a
    /// nested cell reference.
    pub fn is_cell_like(&self) -> bool {
        matches!(
            self,
            TypeCategory::Cell
                | TypeCategory::Slice
                | TypeCategory::Builder
                | TypeCategory::Optional(_)
                | TypeCategory::Either(_, _)
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeCategory::Unknown(_))
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCategory::Integer { bits, signed: true } => write!(f, "int{}", bits),
            TypeCategory::Integer { bits, signed: false } => write!(f, "uint{}", bits),
            TypeCategory::Boolean => f.write_str("bool"),
            TypeCategory::Address => f.write_str("address"),
            TypeCategory::Cell => f.write_str("cell"),
            TypeCategory::Slice => f.write_str("slice"),
            TypeCategory::Builder => f.write_str("builder"),
            TypeCategory::Text => f.write_str("text"),
            TypeCategory::Optional(inner) => write!(f, "(Maybe {})", inner),
            TypeCategory::Either(l, r) => write!(f, "(Either {} {})", l, r),
            TypeCategory::VarUInt(n) => write!(f, "(VarUInteger {})", n),
            TypeCategory::Unknown(raw) => write!(f, "?{}", raw),
        }
    }
}

/// Map a raw type token to its category. First match wins:
///
/// 1. exact literals: fixed-width integers, booleans, addresses, text
/// 2. `(Maybe ..)`, `(Either ..)`, `(VarUInteger n)` constructors
/// 3. substring `Cell` / `Slice` / `Builder`
/// 4. anything else is `Unknown`
pub fn map_type(raw: &str) -> TypeCategory {
    let token = raw.trim();

    if let Some(int) = parse_fixed_int(token) {
        return int;
    }
    match token {
        "bool" | "Bool" => return TypeCategory::Boolean,
        "msgaddress" | "MsgAddress" | "MsgAddressInt" | "address" => {
            return TypeCategory::Address
        }
        "text" | "string" => return TypeCategory::Text,
        _ => {}
    }

    if let Some(inner) = constructor_args(token, "Maybe") {
        return TypeCategory::Optional(Box::new(map_type(inner)));
    }
    if let Some(inner) = constructor_args(token, "Either") {
        let mut arms = split_top_level(inner).into_iter();
        let left = arms.next().map(map_type);
        let right = arms.next().map(map_type);
        return TypeCategory::Either(
            Box::new(left.unwrap_or_else(|| TypeCategory::Unknown(String::new()))),
            Box::new(right.unwrap_or_else(|| TypeCategory::Unknown(String::new()))),
        );
    }
    if let Some(inner) = constructor_args(token, "VarUInteger") {
        let bound = inner.trim().parse().unwrap_or(DEFAULT_VAR_UINT_BYTES);
        return TypeCategory::VarUInt(bound);
    }

    if token.contains("Cell") {
        TypeCategory::Cell
    } else if token.contains("Slice") {
        TypeCategory::Slice
    } else if token.contains("Builder") {
        TypeCategory::Builder
    } else {
        TypeCategory::Unknown(token.to_string())
    }
}

/// Map a parameter, falling back to its declaration category when the raw
/// type is empty (`<int name="x"/>` and friends).
pub fn map_parameter(param: &Parameter) -> TypeCategory {
    if !param.raw_type.trim().is_empty() {
        return map_type(&param.raw_type);
    }
    match param.category.as_deref() {
        Some("int") => TypeCategory::Integer {
            bits: DEFAULT_INT_BITS,
            signed: true,
        },
        Some("cell") => TypeCategory::Cell,
        Some("slice") => TypeCategory::Slice,
        Some(other) => TypeCategory::Unknown(other.to_string()),
        None => TypeCategory::Unknown(String::new()),
    }
}

fn parse_fixed_int(token: &str) -> Option<TypeCategory> {
    let (digits, signed, max) = if let Some(d) = token.strip_prefix("uint") {
        (d, false, 256)
    } else if let Some(d) = token.strip_prefix("int") {
        (d, true, 257)
    } else {
        return None;
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let bits: u16 = digits.parse().ok()?;
    (1..=max)
        .contains(&bits)
        .then_some(TypeCategory::Integer { bits, signed })
}

/// `(Name args)` -> `args`
fn constructor_args<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    let inner = token.strip_prefix('(')?.strip_suffix(')')?;
    let args = inner.strip_prefix(name)?;
    if args.is_empty() {
        return Some(args);
    }
    args.strip_prefix(' ')
}

/// Split on spaces outside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ' ' if depth == 0 => {
                if i > start {
                    parts.push(&s[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < s.len() {
        parts.push(&s[start..]);
    }
    parts
}
