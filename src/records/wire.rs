use std::fmt;

use serde::{
    Deserializer,
    de::{self, Visitor},
};

// The document store casts form strings into numbers, but older documents and
// hand-edited payloads still carry "85" or "" on the wire.
fn parse_numeric_text<E: de::Error>(text: &str) -> Result<Option<i64>, E> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| E::custom(format!("expected a whole number, got '{trimmed}'")))
}

struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a whole number, a numeric string, or null")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .map(Some)
            .map_err(|_| E::custom("number out of range"))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.fract() == 0.0 && value.is_finite() {
            Ok(Some(value as i64))
        } else {
            Err(E::custom(format!("expected a whole number, got {value}")))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        parse_numeric_text(value)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(LenientNumber)
    }
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientNumber)
}

pub fn required_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_number(deserializer)?.ok_or_else(|| de::Error::custom("missing numeric value"))
}

pub fn optional_year<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_number(deserializer)? {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a non-negative number, got {value}"))),
    }
}

pub fn required_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = required_number(deserializer)?;
    i32::try_from(value).map_err(|_| de::Error::custom(format!("year out of range: {value}")))
}
