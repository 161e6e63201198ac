use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Paid amount in an order update.
///
/// The three states map to the wire as follows:
/// - `Unchanged` → the `totalPaid` key is omitted
/// - `Cleared`   → `"totalPaid": null`
/// - `Set(n)`    → `"totalPaid": n`
///
/// Fields of this type must be declared with
/// `#[serde(default, skip_serializing_if = "PaidAmount::is_unchanged")]`,
/// otherwise `Unchanged` would be written as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaidAmount {
    #[default]
    Unchanged,
    Cleared,
    Set(u64),
}

impl PaidAmount {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, PaidAmount::Unchanged)
    }
}

impl Serialize for PaidAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PaidAmount::Set(v) => serializer.serialize_u64(*v),
            PaidAmount::Unchanged | PaidAmount::Cleared => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for PaidAmount {
    /// Only called when the key is present, so `null` means `Cleared`.
    /// A missing key falls back to `Default` (`Unchanged`).
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<u64>::deserialize(deserializer)? {
            Some(v) => PaidAmount::Set(v),
            None => PaidAmount::Cleared,
        })
    }
}
