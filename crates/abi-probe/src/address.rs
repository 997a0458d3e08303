//! Standard internal addresses (`addr_std` without anycast).
//!
//! Two text forms are accepted: raw `<workchain>:<64 hex digits>` and the
//! 48-character user-friendly form (base64url or base64 over
//! `tag | workchain | hash | crc16`).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::cell::Cell;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;
const FRIENDLY_LEN: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid raw address '{0}'")]
    InvalidRaw(String),

    #[error("invalid user-friendly address '{0}'")]
    InvalidFriendly(String),

    #[error("checksum mismatch in '{0}'")]
    Checksum(String),

    #[error("cell does not start with a standard address")]
    NotStandard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl Address {
    /// Serialized size in bits: `10`, anycast bit, workchain, hash.
    pub const BIT_LEN: usize = 2 + 1 + 8 + 256;

    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Basechain address with an all-zero hash. Used wherever a structurally
    /// valid address is needed but none is known.
    pub fn zero() -> Self {
        Self::new(0, [0; 32])
    }

    /// Parse either text form.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.contains(':') {
            Self::from_raw(s)
        } else {
            Self::from_friendly(s)
        }
    }

    pub fn from_raw(s: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::InvalidRaw(s.to_string());
        let (wc, hash_hex) = s.split_once(':').ok_or_else(invalid)?;
        let workchain: i8 = wc.parse().map_err(|_| invalid())?;
        let bytes = hex::decode(hash_hex).map_err(|_| invalid())?;
        let hash: [u8; 32] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self { workchain, hash })
    }

    pub fn from_friendly(s: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::InvalidFriendly(s.to_string());
        let normalized = s.replace('+', "-").replace('/', "_");
        let bytes = URL_SAFE_NO_PAD.decode(normalized).map_err(|_| invalid())?;
        if bytes.len() != FRIENDLY_LEN {
            return Err(invalid());
        }
        let tag = bytes[0] & !TAG_TESTNET;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(invalid());
        }
        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if crc16(&bytes[..34]) != expected {
            return Err(AddressError::Checksum(s.to_string()));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);
        Ok(Self {
            workchain: bytes[1] as i8,
            hash,
        })
    }

    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if testnet {
            tag |= TAG_TESTNET;
        }
        let mut bytes = Vec::with_capacity(FRIENDLY_LEN);
        bytes.push(tag);
        bytes.push(self.workchain as u8);
        bytes.extend_from_slice(&self.hash);
        let crc = crc16(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decode a `MsgAddress` at the start of a cell: `addr_none` gives
    /// `None`, `addr_std` without anycast gives the address.
    pub fn from_cell(cell: &Cell) -> Result<Option<Self>, AddressError> {
        cell.parse()
            .load_address()
            .map_err(|_| AddressError::NotStandard)
    }
}

/// CRC-16/XMODEM.
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellBuilder;

    const RAW: &str = "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8";

    #[test]
    fn test_zero_address_friendly() {
        assert_eq!(
            Address::zero().to_friendly(true, false),
            "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c"
        );
        assert_eq!(
            Address::zero().to_friendly(false, false),
            "UQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAJKZ"
        );
    }

    #[test]
    fn test_raw_and_friendly_agree() {
        let addr = Address::parse(RAW).unwrap();
        assert_eq!(addr.to_raw(), RAW);
        assert_eq!(
            addr.to_friendly(true, false),
            "EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N"
        );
        assert_eq!(
            Address::parse("EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N").unwrap(),
            addr
        );
    }

    #[test]
    fn test_masterchain_friendly() {
        let addr = Address::parse("Ef-D39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqOLF").unwrap();
        assert_eq!(addr.workchain, -1);
        assert_eq!(
            Address::parse("Ef+D39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqOLF").unwrap(),
            addr
        );
    }

    #[test]
    fn test_bad_inputs() {
        assert!(matches!(
            Address::parse("EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2M"),
            Err(AddressError::Checksum(_))
        ));
        assert!(Address::parse("0:zz").is_err());
        assert!(Address::parse("hello").is_err());
    }

    #[test]
    fn test_cell_roundtrip() {
        let addr = Address::parse(RAW).unwrap();
        let mut b = CellBuilder::new();
        b.store_address(Some(&addr)).unwrap();
        let cell = b.build();
        assert_eq!(cell.bit_len(), Address::BIT_LEN);
        assert_eq!(Address::from_cell(&cell).unwrap(), Some(addr));

        let mut b = CellBuilder::new();
        b.store_address(None).unwrap();
        assert_eq!(Address::from_cell(&b.build()).unwrap(), None);
    }
}
