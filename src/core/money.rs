//! Serializers that write `Decimal` amounts as JSON numbers.
//!
//! Reading numbers is handled by rust_decimal's `serde-arbitrary-precision`
//! feature; writing still needs the amount turned into a `serde_json::Number`.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::ser::{Error, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Number;

fn number<E: Error>(value: &Decimal) -> Result<Number, E> {
    Number::from_str(&value.to_string()).map_err(E::custom)
}

pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    number::<S::Error>(value)?.serialize(serializer)
}

pub fn serialize_option<S: Serializer>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_some(&number::<S::Error>(value)?),
        None => serializer.serialize_none(),
    }
}

pub fn serialize_map<K: Serialize, S: Serializer>(
    values: &BTreeMap<K, Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(values.len()))?;
    for (key, value) in values {
        map.serialize_entry(key, &number::<S::Error>(value)?)?;
    }
    map.end()
}
