//! Three-valued field updates for partial writes.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// Update instruction for a nullable column.
///
/// - `Unchanged`: leave the stored value alone
/// - `Set(v)`: write `v`
/// - `Clear`: write SQL `NULL`
///
/// When deserialized with `#[serde(default)]`, a missing field becomes
/// `Unchanged`, `null` becomes `Clear`, and a value becomes `Set`:
///
/// ```
/// use serde::Deserialize;
/// use todo_store::db::Patch;
///
/// #[derive(Deserialize)]
/// struct Example {
///     #[serde(default)]
///     description: Patch<String>,
/// }
///
/// let missing: Example = serde_json::from_str("{}").unwrap();
/// assert_eq!(missing.description, Patch::Unchanged);
///
/// let null: Example = serde_json::from_str(r#"{"description": null}"#).unwrap();
/// assert_eq!(null.description, Patch::Clear);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    Set(T),
    Clear,
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// The value to write, or `None` when the column should not be touched.
    ///
    /// `Some(None)` means "write NULL".
    pub fn as_write(&self) -> Option<Option<&T>> {
        match self {
            Patch::Unchanged => None,
            Patch::Set(v) => Some(Some(v)),
            Patch::Clear => Some(None),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some(v)` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct PatchVisitor<T> {
            _inner: PhantomData<T>,
        }

        impl<'de, T: Deserialize<'de>> serde::de::Visitor<'de> for PatchVisitor<T> {
            type Value = Patch<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a value or null")
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Patch::Clear)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Patch::Clear)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                T::deserialize(deserializer).map(Patch::Set)
            }
        }

        de.deserialize_option(PatchVisitor {
            _inner: PhantomData,
        })
    }
}
