//! Lenient field deserializers for stored records.
//!
//! Collections are read back from a key-value store that carries whatever the
//! last writer put there. Numeric fields that are missing, null, non-numeric,
//! or out of range deserialize to zero instead of failing the record, so a
//! corrupt price or quantity degrades to zero contribution rather than
//! crashing a read path.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

pub(crate) fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(unsigned_from_value(&value).and_then(|v| u32::try_from(v).ok()).unwrap_or(0))
}

pub(crate) fn lenient_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(unsigned_from_value(&value).and_then(|v| u8::try_from(v).ok()).unwrap_or(0))
}

fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap_or_default(),
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

fn unsigned_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
