//! Comparison operators: display symbols, labels and per-type applicability
use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of comparison operators a condition can use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    Eq,          // =
    Ne,          // !=
    Lt,          // <
    Le,          // <=
    Gt,          // >
    Ge,          // >=
    In,          // in
    NotIn,       // not in
    Contains,    // ?
    NotContains, // !?
    Starts,      // =:
    Ends,        // :=
    Regex,       // =~
}

/// Applicability classes: which operators a column type may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    String,
    Number,
    Boolean,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::In,
        Operator::NotIn,
        Operator::Contains,
        Operator::NotContains,
        Operator::Starts,
        Operator::Ends,
        Operator::Regex,
    ];

    /// Canonical symbol as written in filter text
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Contains => "?",
            Operator::NotContains => "!?",
            Operator::Starts => "=:",
            Operator::Ends => ":=",
            Operator::Regex => "=~",
        }
    }

    /// Human readable label for pickers and tooltips
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::Ne => "does not equal",
            Operator::Lt => "less than",
            Operator::Le => "less than or equal to",
            Operator::Gt => "greater than",
            Operator::Ge => "greater than or equal to",
            Operator::In => "is one of",
            Operator::NotIn => "is not one of",
            Operator::Contains => "contains",
            Operator::NotContains => "does not contain",
            Operator::Starts => "starts with",
            Operator::Ends => "ends with",
            Operator::Regex => "matches regex",
        }
    }

    /// Enum tag used in the structured representation (`"eq"`, `"notin"`, ...)
    pub fn tag(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::Contains => "contains",
            Operator::NotContains => "notcontains",
            Operator::Starts => "starts",
            Operator::Ends => "ends",
            Operator::Regex => "regex",
        }
    }

    /// Resolve a comparator symbol. Unknown symbols resolve to `Eq`.
    ///
    /// Keyword symbols are matched ignoring ASCII case and runs of
    /// whitespace, so `NOT   IN` resolves to `NotIn`.
    pub fn for_symbol(symbol: &str) -> Operator {
        let normalized = symbol
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == normalized)
            .unwrap_or_else(|| {
                log::trace!("unknown comparator symbol {:?}, defaulting to eq", symbol);
                Operator::Eq
            })
    }

    /// Resolve an enum tag. Unknown tags resolve to `Eq`.
    pub fn for_tag(tag: &str) -> Operator {
        let tag = tag.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.tag() == tag)
            .unwrap_or_else(|| {
                log::trace!("unknown operator tag {:?}, defaulting to eq", tag);
                Operator::Eq
            })
    }

    /// `in` and `not in` take a parenthesized list instead of a scalar
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn is_applicable_to(&self, class: OperatorClass) -> bool {
        class.contains(*self)
    }
}

impl OperatorClass {
    pub fn contains(&self, op: Operator) -> bool {
        use Operator::*;
        match self {
            OperatorClass::String => true,
            OperatorClass::Number => matches!(op, Eq | Ne | Lt | Le | Gt | Ge | In | NotIn),
            OperatorClass::Boolean => matches!(op, Eq | Ne),
        }
    }

    /// Every operator in this class, in declaration order
    pub fn operators(&self) -> Vec<Operator> {
        Operator::ALL
            .into_iter()
            .filter(|op| self.contains(*op))
            .collect()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// Persisted history may carry operator tags this build does not know about
impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Operator::for_tag(&tag))
    }
}
