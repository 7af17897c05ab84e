//! Integers that travel as JSON strings so browser clients never round them
//! through an `f64`. Accepts either form on the way in.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberInput<T> {
        Text(String),
        Number(T),
    }

    match NumberInput::<T>::deserialize(deserializer)? {
        NumberInput::Text(raw) => raw.trim().parse::<T>().map_err(D::Error::custom),
        NumberInput::Number(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Seeded {
        #[serde(with = "super")]
        seed: u64,
    }

    #[test]
    fn seed_serializes_as_string() {
        let raw = serde_json::to_string(&Seeded { seed: u64::MAX }).expect("serialize");
        assert_eq!(raw, format!(r#"{{"seed":"{}"}}"#, u64::MAX));
    }

    #[test]
    fn seed_accepts_string_or_number() {
        let text: Seeded = serde_json::from_str(r#"{"seed":"4242"}"#).expect("string seed");
        let number: Seeded = serde_json::from_str(r#"{"seed":4242}"#).expect("numeric seed");
        assert_eq!(text, number);
    }

    #[test]
    fn seed_rejects_garbage() {
        assert!(serde_json::from_str::<Seeded>(r#"{"seed":"twelve"}"#).is_err());
    }
}
