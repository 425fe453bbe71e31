//! Lenient field deserializers for config data records.
//!
//! Raw configs often come from loosely typed sources where `5` and `"5"` mean
//! the same thing. Annotate a string field to accept any scalar:
//!
//! ```
//! use serde::Deserialize;
//! use templa::config::coerce;
//!
//! #[derive(Deserialize)]
//! struct Record {
//!     #[serde(deserialize_with = "coerce::string_from_scalar")]
//!     port: String,
//! }
//!
//! let record: Record = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
//! assert_eq!(record.port, "8080");
//! ```

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::String(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize a string, accepting numbers and booleans as their text form.
pub fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

/// Like [`string_from_scalar`], mapping null to `None`.
///
/// Pair with `#[serde(default)]` so a missing key is also `None`.
pub fn option_string_from_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer).map(|scalar| scalar.map(Scalar::into_string))
}
