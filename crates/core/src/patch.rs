//! Partial-update helpers.
//!
//! Update payloads keep a stored value when the field is omitted. For
//! clearable fields the payload type is `Option<Option<T>>`:
//!
//! | JSON                 | Value              |
//! |----------------------|--------------------|
//! | key absent           | `None`             |
//! | `"key": null`        | `Some(None)`       |
//! | `"key": value`       | `Some(Some(value))`|
//!
//! Pair the field with `#[serde(default, deserialize_with = "nullable")]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present key (null or not) into `Some(..)`.
///
/// Absent keys never reach this function; `#[serde(default)]` supplies `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a plain optional field: overwrite when present, keep otherwise.
pub fn keep_or<T>(current: &mut T, incoming: Option<T>) {
    if let Some(value) = incoming {
        *current = value;
    }
}

/// Apply a clearable field: `Some(None)` clears, `Some(Some(v))` sets, `None` keeps.
pub fn keep_or_clear<T>(current: &mut Option<T>, incoming: Option<Option<T>>) {
    if let Some(value) = incoming {
        *current = value;
    }
}
