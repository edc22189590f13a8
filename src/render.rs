//! NRQL rendering of value objects.
//!
//! Converts time periods and moments into the fragments that appear
//! after a clause keyword.

/// Trait for converting a value into an NRQL fragment.
pub trait ToNrql {
    /// Convert this value to its NRQL representation.
    fn to_nrql(&self) -> String;
}
