//! Serialization helpers for the orderbook wire format

use alloy_primitives::{hex, Address, U256};
use serde::{Deserialize, Serialize};

/// Format an address as a lowercase, `0x` prefixed hex string
pub fn address_to_lower_hex(address: &Address) -> String {
    hex::encode_prefixed(address.as_slice())
}

/// Parse a base-10 integer string into a U256
pub fn parse_decimal_u256(s: &str) -> Result<U256, crate::error::ApiTypeError> {
    U256::from_str_radix(s.trim(), 10).map_err(crate::error::ApiTypeError::parse)
}

/// An integer that may arrive either as a JSON string or a JSON number
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    /// A decimal string
    String(String),
    /// A native JSON number
    Number(u64),
}

/// A module for serializing and deserializing addresses as lowercase strings
pub mod address_string_serialization {
    use std::str::FromStr;

    use alloy_primitives::Address;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an address to a lowercase string
    pub fn serialize<S: Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::address_to_lower_hex(address))
    }

    /// Deserialize a string to an address
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        let s = String::deserialize(d)?;
        Address::from_str(&s).map_err(|_| D::Error::custom("Invalid address"))
    }
}

/// A module for serializing and deserializing optional addresses
pub mod option_address_string_serialization {
    use std::str::FromStr;

    use alloy_primitives::Address;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an optional address to a lowercase string
    pub fn serialize<S: Serializer>(address: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
        match address {
            Some(addr) => s.serialize_some(&super::address_to_lower_hex(addr)),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional string to an address
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Address>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.filter(|s| !s.is_empty())
            .map(|s| Address::from_str(&s).map_err(|_| D::Error::custom("Invalid address")))
            .transpose()
    }
}

/// A module for serializing and deserializing U256 as base-10 strings
///
/// Deserialization also accepts plain JSON numbers, which the orderbook uses
/// for some timestamp fields
pub mod u256_string_serialization {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::StringOrNumber;

    /// Serialize a U256 to a string
    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    /// Deserialize a string or number to a U256
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        match StringOrNumber::deserialize(d)? {
            StringOrNumber::String(s) => {
                super::parse_decimal_u256(&s).map_err(|_| D::Error::custom("Invalid U256 value"))
            },
            StringOrNumber::Number(n) => Ok(U256::from(n)),
        }
    }
}

/// A module for serializing and deserializing optional U256 values
pub mod option_u256_string_serialization {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::StringOrNumber;

    /// Serialize an optional U256 to a string
    pub fn serialize<S: Serializer>(value: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&v.to_string()),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional string or number to a U256
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
        match Option::<StringOrNumber>::deserialize(d)? {
            Some(StringOrNumber::String(s)) => super::parse_decimal_u256(&s)
                .map(Some)
                .map_err(|_| D::Error::custom("Invalid U256 value")),
            Some(StringOrNumber::Number(n)) => Ok(Some(U256::from(n))),
            None => Ok(None),
        }
    }
}

/// A module for serializing and deserializing bytes from a hex string
pub mod bytes_string_serialization {
    use alloy_primitives::{hex, Bytes};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize bytes to a hex string
    pub fn serialize<S: Serializer>(value: &Bytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode_prefixed(value))
    }

    /// Deserialize a hex string to bytes
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map(Bytes::from).map_err(|_| D::Error::custom("Invalid bytes value"))
    }
}
