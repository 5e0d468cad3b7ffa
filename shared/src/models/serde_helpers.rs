//! Common serde helpers for partial-update payloads

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field while keeping "absent" and "null" apart
///
/// - 字段缺失 → `None` (需要配合 `#[serde(default)]`)
/// - `null` → `Some(None)`
/// - 值 → `Some(Some(v))`
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
