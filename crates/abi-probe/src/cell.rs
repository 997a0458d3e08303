//! Ordinary TON cells, the builder used to serialize message bodies and the
//! slice used to read them back.
//!
//! A cell holds up to 1023 data bits and up to 4 references to other cells.
//! Its identity is the SHA-256 representation hash, computed once when the
//! cell is built.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

use crate::address::Address;

pub const MAX_DATA_BITS: usize = 1023;
pub const MAX_REFS: usize = 4;

/// Bytes per cell in a snake-encoded string tail.
const SNAKE_CHUNK_BYTES: usize = 127;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("cell overflow: {requested} bits requested, {available} available")]
    BitOverflow { requested: usize, available: usize },

    #[error("cell overflow: no more than 4 references per cell")]
    RefOverflow,

    #[error("value does not fit in {bits} bits")]
    ValueOutOfRange { bits: u16 },

    #[error("invalid bit width {0}")]
    InvalidWidth(u16),

    #[error("variable-length integer needs {len} bytes but the bound is {bound}")]
    VarUIntOverflow { len: usize, bound: u16 },

    #[error("cell underflow: {requested} bits requested, {available} left")]
    Underflow { requested: usize, available: usize },

    #[error("cell underflow: no references left")]
    RefUnderflow,

    #[error("opcode mismatch: expected {expected:#x}, found {found:#x}")]
    OpcodeMismatch { expected: u64, found: u64 },

    #[error("not a standard address")]
    InvalidAddress,

    #[error("text is not byte-aligned")]
    NotByteAligned,

    #[error("text is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Clone)]
pub struct Cell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
    depth: u16,
    hash: [u8; 32],
}

impl Cell {
    /// Cell with no data and no references.
    pub fn empty() -> Self {
        CellBuilder::new().build()
    }

    fn finalize(mut data: Vec<u8>, bit_len: usize, refs: Vec<Arc<Cell>>) -> Self {
        data.truncate(bit_len.div_ceil(8));
        let depth = refs.iter().map(|r| r.depth + 1).max().unwrap_or(0);

        let mut hasher = Sha256::new();
        let d1 = refs.len() as u8;
        let d2 = (bit_len / 8 + bit_len.div_ceil(8)) as u8;
        hasher.update([d1, d2]);

        let mut padded = data.clone();
        if bit_len % 8 != 0 {
            if let Some(last) = padded.last_mut() {
                *last |= 1 << (7 - bit_len % 8);
            }
        }
        hasher.update(&padded);
        for r in &refs {
            hasher.update(r.depth.to_be_bytes());
        }
        for r in &refs {
            hasher.update(r.hash);
        }

        Self {
            data,
            bit_len,
            refs,
            depth,
            hash: hasher.finalize().into(),
        }
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Data bits packed MSB first; trailing bits of the last byte are zero.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    pub fn reference(&self, index: usize) -> Option<&Cell> {
        self.refs.get(index).map(Arc::as_ref)
    }

    pub fn references(&self) -> impl Iterator<Item = &Cell> {
        self.refs.iter().map(Arc::as_ref)
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Reader positioned at the first data bit and the first reference.
    pub fn parse(&self) -> CellSlice<'_> {
        CellSlice {
            cell: self,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        (index < self.bit_len).then(|| self.data[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Read `bits` (at most 64) starting at `offset`.
    pub fn read_u64(&self, offset: usize, bits: u16) -> Option<u64> {
        if bits > 64 || offset + bits as usize > self.bit_len {
            return None;
        }
        let mut value = 0u64;
        for i in 0..bits as usize {
            value = (value << 1) | u64::from(self.bit(offset + i)?);
        }
        Some(value)
    }

    /// Concatenated bytes of a snake-encoded string: this cell's data, then
    /// the first reference's, recursively. `None` if any link is not
    /// byte-aligned.
    pub fn snake_bytes(&self) -> Option<Vec<u8>> {
        if self.bit_len % 8 != 0 {
            return None;
        }
        let mut out = self.data.clone();
        if let Some(next) = self.refs.first() {
            out.extend(next.snake_bytes()?);
        }
        Some(out)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.bit_len)
            .field("data", &hex::encode(&self.data))
            .field("refs", &self.refs.len())
            .field("hash", &self.hash_hex())
            .finish()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

/// Append-only cell writer. Every `store_*` checks capacity before writing,
/// so a failed store leaves the builder unchanged.
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits_left(&self) -> usize {
        MAX_DATA_BITS - self.bit_len
    }

    pub fn refs_left(&self) -> usize {
        MAX_REFS - self.refs.len()
    }

    fn ensure_bits(&self, requested: usize) -> Result<(), CellError> {
        if requested > self.bits_left() {
            return Err(CellError::BitOverflow {
                requested,
                available: self.bits_left(),
            });
        }
        Ok(())
    }

    fn ensure_refs(&self, requested: usize) -> Result<(), CellError> {
        if requested > self.refs_left() {
            return Err(CellError::RefOverflow);
        }
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 0x80 >> (self.bit_len % 8);
            }
        }
        self.bit_len += 1;
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            for i in 0..8 {
                self.push_bit(byte & (0x80 >> i) != 0);
            }
        }
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        self.ensure_bits(1)?;
        self.push_bit(bit);
        Ok(self)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        self.ensure_bits(bytes.len() * 8)?;
        self.push_bytes(bytes);
        Ok(self)
    }

    /// Unsigned integer of at most 64 bits.
    pub fn store_u64(&mut self, value: u64, bits: u16) -> Result<&mut Self, CellError> {
        if bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        if bits < 64 && value >> u32::from(bits) != 0 {
            return Err(CellError::ValueOutOfRange { bits });
        }
        self.ensure_bits(bits as usize)?;
        for i in (0..u32::from(bits)).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
        Ok(self)
    }

    /// Two's complement signed integer of at most 64 bits.
    pub fn store_i64(&mut self, value: i64, bits: u16) -> Result<&mut Self, CellError> {
        if bits == 0 || bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        let (raw, mask) = if bits == 64 {
            (value as u64, u64::MAX)
        } else {
            let half = 1i64 << (bits - 1);
            if value < -half || value >= half {
                return Err(CellError::ValueOutOfRange { bits });
            }
            (value as u64, (1u64 << bits) - 1)
        };
        self.store_u64(raw & mask, bits)
    }

    pub fn store_uint(&mut self, value: &BigUint, bits: u16) -> Result<&mut Self, CellError> {
        if value.bits() > u64::from(bits) {
            return Err(CellError::ValueOutOfRange { bits });
        }
        self.ensure_bits(bits as usize)?;
        for i in (0..u64::from(bits)).rev() {
            self.push_bit(value.bit(i));
        }
        Ok(self)
    }

    pub fn store_int(&mut self, value: &BigInt, bits: u16) -> Result<&mut Self, CellError> {
        if bits == 0 {
            return Err(CellError::InvalidWidth(bits));
        }
        let half = BigInt::one() << (bits - 1);
        if *value < -&half || *value >= half {
            return Err(CellError::ValueOutOfRange { bits });
        }
        let unsigned = match value.sign() {
            Sign::Minus => (value + (BigInt::one() << bits)).to_biguint(),
            _ => value.to_biguint(),
        }
        .ok_or(CellError::ValueOutOfRange { bits })?;
        self.store_uint(&unsigned, bits)
    }

    /// `VarUInteger bound`: a length in bytes (strictly below `bound`) in
    /// `ceil(log2(bound))` bits, then the value in that many bytes.
    pub fn store_var_uint(&mut self, value: &BigUint, bound: u16) -> Result<&mut Self, CellError> {
        if bound == 0 {
            return Err(CellError::InvalidWidth(bound));
        }
        let len = value.bits().div_ceil(8) as usize;
        if len >= bound as usize {
            return Err(CellError::VarUIntOverflow { len, bound });
        }
        let header_bits = (u16::BITS - (bound - 1).leading_zeros()) as u16;
        self.ensure_bits(header_bits as usize + len * 8)?;
        self.store_u64(len as u64, header_bits)?;
        self.store_uint(value, (len * 8) as u16)
    }

    /// `addr_std` without anycast, or `addr_none` for `None`.
    pub fn store_address(&mut self, address: Option<&Address>) -> Result<&mut Self, CellError> {
        let Some(address) = address else {
            return self.store_u64(0, 2);
        };
        self.ensure_bits(Address::BIT_LEN)?;
        self.store_u64(0b100, 3)?;
        self.store_i64(i64::from(address.workchain), 8)?;
        self.store_bytes(&address.hash)
    }

    pub fn store_ref(&mut self, cell: &Cell) -> Result<&mut Self, CellError> {
        self.ensure_refs(1)?;
        self.refs.push(Arc::new(cell.clone()));
        Ok(self)
    }

    /// Presence bit, then the reference when present.
    pub fn store_maybe_ref(&mut self, cell: Option<&Cell>) -> Result<&mut Self, CellError> {
        match cell {
            Some(cell) => {
                self.ensure_bits(1)?;
                self.ensure_refs(1)?;
                self.push_bit(true);
                self.store_ref(cell)
            }
            None => self.store_bit(false),
        }
    }

    /// UTF-8 text: as many bytes inline as fit, the rest as a snake chain
    /// in the next reference.
    pub fn store_text(&mut self, text: &str) -> Result<&mut Self, CellError> {
        let bytes = text.as_bytes();
        let (head, tail) = bytes.split_at((self.bits_left() / 8).min(bytes.len()));
        if !tail.is_empty() {
            self.ensure_refs(1)?;
        }
        self.push_bytes(head);
        if !tail.is_empty() {
            self.refs.push(Arc::new(snake_chain(tail)));
        }
        Ok(self)
    }

    pub fn build(self) -> Cell {
        Cell::finalize(self.data, self.bit_len, self.refs)
    }
}

/// Sequential reader over a cell, the inverse of [`CellBuilder`]. A failed
/// load leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_pos: usize,
    ref_pos: usize,
}

impl<'a> CellSlice<'a> {
    pub fn bits_left(&self) -> usize {
        self.cell.bit_len - self.bit_pos
    }

    pub fn refs_left(&self) -> usize {
        self.cell.refs.len() - self.ref_pos
    }

    fn ensure_bits(&self, requested: usize) -> Result<(), CellError> {
        if requested > self.bits_left() {
            return Err(CellError::Underflow {
                requested,
                available: self.bits_left(),
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let bit = self.cell.data[self.bit_pos / 8] & (0x80 >> (self.bit_pos % 8)) != 0;
        self.bit_pos += 1;
        bit
    }

    pub fn load_bit(&mut self) -> Result<bool, CellError> {
        self.ensure_bits(1)?;
        Ok(self.take_bit())
    }

    /// Unsigned integer of at most 64 bits.
    pub fn load_u64(&mut self, bits: u16) -> Result<u64, CellError> {
        if bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        self.ensure_bits(bits as usize)?;
        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.take_bit());
        }
        Ok(value)
    }

    /// Two's complement signed integer of at most 64 bits.
    pub fn load_i64(&mut self, bits: u16) -> Result<i64, CellError> {
        if bits == 0 || bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        let raw = self.load_u64(bits)?;
        let shift = 64 - u32::from(bits);
        Ok(((raw << shift) as i64) >> shift)
    }

    pub fn load_uint(&mut self, bits: u16) -> Result<BigUint, CellError> {
        self.ensure_bits(bits as usize)?;
        let mut value = BigUint::default();
        for _ in 0..bits {
            value = (value << 1u8) + u8::from(self.take_bit());
        }
        Ok(value)
    }

    pub fn load_int(&mut self, bits: u16) -> Result<BigInt, CellError> {
        if bits == 0 {
            return Err(CellError::InvalidWidth(bits));
        }
        let raw = BigInt::from(self.load_uint(bits)?);
        if raw.bit(u64::from(bits) - 1) {
            Ok(raw - (BigInt::one() << bits))
        } else {
            Ok(raw)
        }
    }

    /// Counterpart of [`CellBuilder::store_var_uint`].
    pub fn load_var_uint(&mut self, bound: u16) -> Result<BigUint, CellError> {
        if bound == 0 {
            return Err(CellError::InvalidWidth(bound));
        }
        let header_bits = (u16::BITS - (bound - 1).leading_zeros()) as u16;
        let start = self.bit_pos;
        let len = self.load_u64(header_bits)? as usize;
        if len >= bound as usize {
            self.bit_pos = start;
            return Err(CellError::VarUIntOverflow { len, bound });
        }
        let value = self.load_uint((len * 8) as u16);
        if value.is_err() {
            self.bit_pos = start;
        }
        value
    }

    /// `addr_none` gives `None`, `addr_std` without anycast gives the address.
    pub fn load_address(&mut self) -> Result<Option<Address>, CellError> {
        let start = self.bit_pos;
        let result = self.read_address();
        if result.is_err() {
            self.bit_pos = start;
        }
        result
    }

    fn read_address(&mut self) -> Result<Option<Address>, CellError> {
        match self.load_u64(2)? {
            0b00 => Ok(None),
            0b10 => {
                if self.load_bit()? {
                    return Err(CellError::InvalidAddress);
                }
                self.ensure_bits(Address::BIT_LEN - 3)?;
                let workchain = self.load_i64(8)? as i8;
                let mut hash = [0u8; 32];
                for byte in hash.iter_mut() {
                    *byte = self.load_u64(8)? as u8;
                }
                Ok(Some(Address::new(workchain, hash)))
            }
            _ => Err(CellError::InvalidAddress),
        }
    }

    /// Like [`Self::load_address`], but `addr_none` is an error.
    pub fn load_std_address(&mut self) -> Result<Address, CellError> {
        let start = self.bit_pos;
        match self.load_address()? {
            Some(address) => Ok(address),
            None => {
                self.bit_pos = start;
                Err(CellError::InvalidAddress)
            }
        }
    }

    pub fn load_ref(&mut self) -> Result<Cell, CellError> {
        let cell = self
            .cell
            .reference(self.ref_pos)
            .ok_or(CellError::RefUnderflow)?
            .clone();
        self.ref_pos += 1;
        Ok(cell)
    }

    pub fn load_maybe_ref(&mut self) -> Result<Option<Cell>, CellError> {
        self.ensure_bits(1)?;
        if self.cell.bit(self.bit_pos) == Some(true) && self.refs_left() == 0 {
            return Err(CellError::RefUnderflow);
        }
        if self.take_bit() {
            self.load_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Counterpart of [`CellBuilder::store_text`]: every remaining data
    /// byte, then the snake chain in the next reference when the cell's
    /// data is full.
    pub fn load_text(&mut self) -> Result<String, CellError> {
        if self.bits_left() % 8 != 0 {
            return Err(CellError::NotByteAligned);
        }
        let mut bytes = Vec::with_capacity(self.bits_left() / 8);
        let data_full = self.cell.bit_len + 8 > MAX_DATA_BITS;
        let tail = if data_full && self.refs_left() > 0 {
            let next = self.cell.reference(self.ref_pos).ok_or(CellError::RefUnderflow)?;
            Some(next.snake_bytes().ok_or(CellError::NotByteAligned)?)
        } else {
            None
        };
        while self.bits_left() > 0 {
            bytes.push(self.load_u64(8)? as u8);
        }
        if let Some(tail) = tail {
            bytes.extend(tail);
            self.ref_pos += 1;
        }
        String::from_utf8(bytes).map_err(|_| CellError::InvalidUtf8)
    }
}

fn snake_chain(bytes: &[u8]) -> Cell {
    let mut next: Option<Cell> = None;
    for chunk in bytes.chunks(SNAKE_CHUNK_BYTES).rev() {
        let mut builder = CellBuilder::new();
        builder.push_bytes(chunk);
        if let Some(cell) = next.take() {
            builder.refs.push(Arc::new(cell));
        }
        next = Some(builder.build());
    }
    next.unwrap_or_default()
}
