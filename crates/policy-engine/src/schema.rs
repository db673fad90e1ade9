use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// An IAM policy document as decoded from JSON.
///
/// `version` and `statements` are `None` only when their key is absent from
/// the source document. `version` keeps whatever JSON value it holds; a
/// single statement object and a statement array both decode to a `Vec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy language version, normally "2012-10-17".
    #[serde(
        rename = "Version",
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<serde_json::Value>,
    /// Statements in document order.
    #[serde(
        rename = "Statement",
        default,
        deserialize_with = "statements",
        skip_serializing_if = "Option::is_none"
    )]
    pub statements: Option<Vec<Statement>>,
}

/// One permission grant or deny unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Sid", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// "Allow" or "Deny". Informational only; no rule inspects it.
    #[serde(rename = "Effect", default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// `None` when the `Action` key is absent.
    #[serde(
        rename = "Action",
        default,
        deserialize_with = "present_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub actions: Option<Vec<String>>,
    /// `None` when the `Resource` key is absent.
    #[serde(
        rename = "Resource",
        default,
        deserialize_with = "present_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub resources: Option<Vec<String>>,
    /// Whether a `Condition` block is present. Its content is never inspected.
    #[serde(rename = "Condition", default, deserialize_with = "present", skip_serializing)]
    pub has_condition: bool,
}

impl Policy {
    /// Decode a policy from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decode a policy from an already-parsed JSON value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// The `Version` value when it is a string.
    pub fn version_str(&self) -> Option<&str> {
        self.version.as_ref().and_then(serde_json::Value::as_str)
    }
}

/// Either a single value or a sequence of values, as IAM allows for
/// `Action` and `Resource`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalise into an ordered sequence.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

// ---------------------------------------------------------------------------
// Field deserializers
// ---------------------------------------------------------------------------

// These only run when the key is present; `#[serde(default)]` covers absence.

// Statements go through `Value` so that only JSON objects are accepted as
// statements. Derived struct impls would also accept a JSON array.
fn statements<'de, D>(deserializer: D) -> Result<Option<Vec<Statement>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        object @ serde_json::Value::Object(_) => vec![object],
        other => {
            return Err(D::Error::custom(format!(
                "expected a statement object or an array of statement objects, found {other}"
            )))
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            if !item.is_object() {
                return Err(D::Error::custom(format!(
                    "statement {} is not an object",
                    idx + 1
                )));
            }
            Statement::deserialize(item).map_err(D::Error::custom)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

fn present_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<OneOrMany<String>>::deserialize(deserializer)?;
    Ok(Some(value.map(OneOrMany::into_vec).unwrap_or_default()))
}

fn present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer).map(|_| true)
}
