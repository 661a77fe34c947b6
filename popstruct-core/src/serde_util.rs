use serde::{Deserialize, Deserializer};

/// Decodes a JSON `null` as the type's default value.
///
/// The backend serializes empty parameter and metric maps as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
