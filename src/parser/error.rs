use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::raw::Rule;

/// Why a filter text was rejected, with spans for diagnostics
#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum FilterError {
    // Syntax errors from pest
    #[error("Syntax error at line {line}, column {col}")]
    #[diagnostic(code(filtertext::syntax))]
    Syntax {
        #[source_code]
        src: String,
        #[label("{expected_msg}")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        expected_msg: String,
        line: usize,
        col: usize,
    },

    #[error("Unknown column: {column}")]
    #[diagnostic(code(filtertext::unknown_column))]
    UnknownColumn {
        column: String,
        #[label("not a known column")]
        span: SourceSpan,
        #[source_code]
        src: String,
        #[help]
        suggestions: Option<String>,
    },

    #[error("No type declared for column: {column}")]
    #[diagnostic(
        code(filtertext::missing_column_type),
        help("Every known column needs a string, number or boolean type")
    )]
    MissingColumnType {
        column: String,
        #[label("column has no type")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Operator '{operator}' is not compatible with {column_type} column '{column}'")]
    #[diagnostic(code(filtertext::incompatible_operator))]
    IncompatibleOperator {
        column: String,
        column_type: String,
        operator: String,
        #[label("incompatible operator")]
        operator_span: SourceSpan,
        #[label("for this column")]
        column_span: SourceSpan,
        #[source_code]
        src: String,
        #[help]
        allowed: Option<String>,
    },

    #[error("Expected {expected}, found: {found}")]
    #[diagnostic(
        code(filtertext::invalid_value),
        help("Check the value type for this column")
    )]
    InvalidValue {
        expected: String,
        found: String,
        #[label("invalid value")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    // Internal errors
    #[error("Internal parser error: {message}")]
    #[diagnostic(code(filtertext::internal))]
    Internal {
        message: String,
        #[source_code]
        src: String,
    },
}

// Extension trait for span location extraction
pub trait SpanExt {
    fn to_location(&self) -> (usize, usize);
    fn to_source_span(&self) -> SourceSpan;
}

impl SpanExt for pest::Span<'_> {
    #[inline]
    fn to_location(&self) -> (usize, usize) {
        self.start_pos().line_col()
    }

    #[inline]
    fn to_source_span(&self) -> SourceSpan {
        (self.start(), self.end() - self.start()).into()
    }
}

/// Convert pest Rule enum to user-friendly names
fn rule_to_friendly_name(rule: &Rule) -> &'static str {
    match rule {
        Rule::filter => "filter",
        Rule::condition | Rule::condition_only => "condition",
        Rule::variable | Rule::variable_only => "column name",
        Rule::connector | Rule::connector_only => "connector (and/or)",
        Rule::comparator_single | Rule::comparator_single_only => "comparator",
        Rule::comparator_multiple | Rule::comparator_multiple_only => "in / not in",
        Rule::comparator_numeric | Rule::comparator_numeric_only => "numeric comparator",
        Rule::comparator_boolean | Rule::comparator_boolean_only => "= or !=",
        Rule::comparator_string | Rule::comparator_string_only => "string comparator",
        Rule::quoted_string | Rule::item_string | Rule::item_string_only => "quoted string",
        Rule::item_boolean | Rule::item_boolean_only => "true, false or null",
        Rule::item_number | Rule::item_number_only => "value",
        Rule::item_multiple | Rule::item_multiple_only => "parenthesized list",
        Rule::item_only => "value",
        Rule::EOI => "end of input",
        _ => "token",
    }
}

/// Generate contextual help text based on error patterns
fn generate_help_text(positives: &[Rule], found_eoi: bool) -> Option<String> {
    if positives.is_empty() {
        return None;
    }

    let expects_value = positives.iter().any(|r| {
        matches!(
            r,
            Rule::item_string | Rule::item_boolean | Rule::item_number
        )
    });
    if expects_value {
        if found_eoi {
            return Some("Add a value after the comparator, like: age > 30".to_string());
        }
        return Some("Expected a value here (a \"quoted string\", number, true/false or null)".to_string());
    }

    if positives.contains(&Rule::item_multiple) {
        return Some("in / not in take a list, like: race in (\"A\", \"B\")".to_string());
    }

    if positives.contains(&Rule::comparator_single) || positives.contains(&Rule::comparator_multiple) {
        return Some("Expected a comparator: = != < <= > >= ? !? =: := =~ in, not in".to_string());
    }

    if positives.contains(&Rule::condition) && found_eoi {
        return Some("Filter is incomplete. Add a condition after the connector.".to_string());
    }

    if positives.contains(&Rule::EOI) || positives.contains(&Rule::connector) {
        return Some("Join conditions with 'and' or 'or'. Nested parentheses are not supported.".to_string());
    }

    None
}

impl FilterError {
    /// Create a syntax error from pest error with diagnostic information
    pub fn from_pest(pest_err: Box<pest::error::Error<Rule>>, src: String) -> Self {
        use pest::error::{ErrorVariant, InputLocation};

        // Non-zero width so miette has something to point at
        let span: SourceSpan = match pest_err.location {
            InputLocation::Pos(pos) => {
                // past the end, point back at the last char
                if pos >= src.len() && pos > 0 {
                    (pos - 1, 1).into()
                } else if pos < src.len() {
                    (pos, 1).into()
                } else {
                    (0, 0).into()
                }
            }
            InputLocation::Span((start, end)) => {
                let width = end.saturating_sub(start).max(1);
                (start, width).into()
            }
        };

        let (line, col) = match pest_err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => (line, col),
            pest::error::LineColLocation::Span((line, col), _) => (line, col),
        };

        let (expected_msg, help) = match &pest_err.variant {
            ErrorVariant::ParsingError {
                positives,
                negatives: _,
            } => {
                let found_eoi = match pest_err.location {
                    InputLocation::Pos(p) => p >= src.len(),
                    InputLocation::Span((_, end)) => end >= src.len(),
                };

                let mut names: Vec<&str> = positives.iter().map(rule_to_friendly_name).collect();
                names.dedup();

                let expected_msg = match names.len() {
                    0 => "Unexpected input".to_string(),
                    1 => format!("Expected {}", names[0]),
                    2 | 3 => format!("Expected one of: {}", names.join(", ")),
                    _ => format!("Expected one of: {}, ...", names[..3].join(", ")),
                };

                (expected_msg, generate_help_text(positives, found_eoi))
            }
            ErrorVariant::CustomError { message } => (message.clone(), None),
        };

        FilterError::Syntax {
            src,
            span,
            help,
            expected_msg,
            line,
            col,
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        FilterError::Internal {
            message: msg.into(),
            src: String::new(),
        }
    }

    /// Add source code to the error
    pub fn with_source(mut self, src: String) -> Self {
        match &mut self {
            FilterError::Syntax { src: s, .. }
            | FilterError::UnknownColumn { src: s, .. }
            | FilterError::MissingColumnType { src: s, .. }
            | FilterError::IncompatibleOperator { src: s, .. }
            | FilterError::InvalidValue { src: s, .. }
            | FilterError::Internal { src: s, .. } => {
                *s = src;
            }
        }
        self
    }
}

/// Known columns within edit distance 2 of `word`
pub fn suggest_columns<'a>(word: &str, known: &'a [String]) -> Vec<&'a str> {
    let word = word.to_lowercase();
    known
        .iter()
        .filter(|name| levenshtein_distance(&word, &name.to_lowercase()) <= 2)
        .map(String::as_str)
        .collect()
}

/// Simple Levenshtein distance implementation for fuzzy matching
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}
