use serde::{Deserialize, Deserializer};

/// Deserializes a field that was present in the payload into `Some`.
///
/// Combined with `#[serde(default)]` this tells an absent key (`None`)
/// apart from an explicit `null` (`Some(None)` or `Some(Value::Null)`).
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
