//! Serde helpers that render `U256` as a base-10 string.
//!
//! Use with `#[serde(with = "crate::u256_dec")]`. Deserialization also
//! accepts `0x`-prefixed hex.

use alloy::primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<U256>().map_err(de::Error::custom)
}
