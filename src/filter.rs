//! Structured filter representation and its canonical text rendering
use std::fmt::{self, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::operator::Operator;

/// A single literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Right hand side of a condition: a list for `in`/`not in`, a scalar otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    List(Vec<Scalar>),
    Scalar(Scalar),
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(Scalar::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub variable: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    And,
    Or,
}

/// Conditions joined left to right by connectors.
///
/// Well-formed filters carry exactly one connector per gap between
/// conditions. Rendering tolerates filters that do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_keyword(s: &str) -> Option<Connector> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Some(Connector::And),
            "or" => Some(Connector::Or),
            _ => None,
        }
    }
}

impl Condition {
    pub fn new(variable: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            variable: variable.into(),
            operator,
            value,
        }
    }
}

impl Filter {
    /// Single-condition filter
    pub fn condition(condition: Condition) -> Self {
        Self {
            conditions: vec![condition],
            connectors: Vec::new(),
        }
    }

    /// Append `condition`, joined to the previous one by `connector`
    pub fn push(mut self, connector: Connector, condition: Condition) -> Self {
        if !self.conditions.is_empty() {
            self.connectors.push(connector);
        }
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Canonical filter text. Never fails; see [`Display`] for the format.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Build a filter from an arbitrary JSON value, typically a persisted
    /// history entry of unknown vintage.
    ///
    /// Anything that does not fit degrades instead of failing: a missing
    /// variable becomes `""`, an unknown operator becomes `eq`, an
    /// unrecognized value becomes `null` and unknown connectors are dropped.
    pub fn from_json_lenient(json: &serde_json::Value) -> Filter {
        use serde_json::Value as Json;

        let conditions = match json.get("conditions") {
            Some(Json::Array(items)) => items.iter().map(lenient_condition).collect(),
            _ => Vec::new(),
        };

        let connectors = match json.get("connectors") {
            Some(Json::Array(items)) => items
                .iter()
                .filter_map(|c| c.as_str().and_then(Connector::from_keyword))
                .collect(),
            _ => Vec::new(),
        };

        Filter {
            conditions,
            connectors,
        }
    }
}

fn lenient_condition(json: &serde_json::Value) -> Condition {
    use serde_json::Value as Json;

    let variable = json
        .get("variable")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();

    let operator = json
        .get("operator")
        .and_then(Json::as_str)
        .map(Operator::for_tag)
        .unwrap_or_default();

    let value = match json.get("value") {
        Some(Json::Array(items)) => Value::List(items.iter().map(lenient_scalar).collect()),
        Some(other) => Value::Scalar(lenient_scalar(other)),
        None => Value::default(),
    };

    Condition {
        variable,
        operator,
        value,
    }
}

fn lenient_scalar(json: &serde_json::Value) -> Scalar {
    use serde_json::Value as Json;

    match json {
        Json::Bool(b) => Scalar::Bool(*b),
        Json::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Null),
        Json::String(s) => Scalar::String(s.clone()),
        Json::Null | Json::Array(_) | Json::Object(_) => Scalar::Null,
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            // the grammar has no escapes, so pick the quote the text lacks
            Scalar::String(s) if s.contains('"') && !s.contains('\'') => write!(f, "'{}'", s),
            Scalar::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::List(items) => write!(f, "({})", items.iter().join(", ")),
            Value::Scalar(s) => write!(f, "{}", s),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.operator.symbol(), self.value)
    }
}

/// `variable SYMBOL value`, with ` connector ` between conditions that have
/// one. The result is trimmed.
impl Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        let last = self.conditions.len().saturating_sub(1);

        for (i, condition) in self.conditions.iter().enumerate() {
            out.push_str(&condition.to_string());
            if i < last {
                if let Some(connector) = self.connectors.get(i) {
                    out.push(' ');
                    out.push_str(connector.as_str());
                    out.push(' ');
                }
            }
        }

        f.write_str(out.trim())
    }
}
