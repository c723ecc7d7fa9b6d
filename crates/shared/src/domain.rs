use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(FileEntryId);
id_newtype!(NotificationId);

/// Server-issued token correlating uploads and the compute request of one
/// intake session.
///
/// The server may answer with either a JSON string or an integer primary key;
/// both are kept as their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireCalculatorId")]
pub struct CalculatorId(pub String);

impl CalculatorId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireCalculatorId {
    Text(String),
    Number(i64),
}

impl From<WireCalculatorId> for CalculatorId {
    fn from(value: WireCalculatorId) -> Self {
        match value {
            WireCalculatorId::Text(text) => Self(text),
            WireCalculatorId::Number(number) => Self(number.to_string()),
        }
    }
}
