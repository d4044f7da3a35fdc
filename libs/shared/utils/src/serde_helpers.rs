use serde::{Deserialize, Deserializer};

/// Deserializes a field that must tell "absent" apart from "null".
///
/// Pair with `#[serde(default)]`: a missing key yields `None`, an explicit
/// `null` yields `Some(None)` and a value yields `Some(Some(value))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
