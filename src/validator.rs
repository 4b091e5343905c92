//! Per-condition semantic checks of filter text against declared columns
use std::collections::HashMap;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::{
    filter::{Condition, Filter, Scalar, Value},
    operator::Operator,
    parser::{
        error::suggest_columns, FilterError, Fragment, RawCondition, RawItem, RawParser, RawValue,
        SpanExt,
    },
    schema::{ColumnSchema, ColumnType},
};

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("numeric literal pattern is valid")
});

/// Validation rule for one column type
pub trait TypeRule: Send + Sync {
    fn column_type(&self) -> ColumnType;

    /// Value shape this rule accepts, for error messages
    fn expected(&self) -> &'static str;

    /// Is `item` an acceptable scalar for this type?
    fn accepts_item(&self, item: &RawItem<'_>) -> bool;

    /// Convert an accepted scalar
    fn scalar(&self, item: &RawItem<'_>) -> Option<Scalar>;

    /// Convert one element of an `in` / `not in` list
    fn list_item(&self, item: &RawItem<'_>) -> Scalar;

    fn accepts_single(&self, op: Operator) -> bool {
        !op.is_multi_value() && self.column_type().operator_class().contains(op)
    }

    fn accepts_list(&self, op: Operator) -> bool {
        op.is_multi_value() && self.column_type().operator_class().contains(op)
    }
}

pub struct NumberRule;
pub struct StringRule;
pub struct BooleanRule;

/// The rule that governs columns of `column_type`
pub fn rule_for(column_type: ColumnType) -> &'static dyn TypeRule {
    static NUMBER: NumberRule = NumberRule;
    static STRING: StringRule = StringRule;
    static BOOLEAN: BooleanRule = BooleanRule;

    match column_type {
        ColumnType::Number => &NUMBER,
        ColumnType::String => &STRING,
        ColumnType::Boolean => &BOOLEAN,
    }
}

fn is_numeric_literal(text: &str) -> bool {
    NUMERIC_LITERAL.is_match(text)
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl TypeRule for NumberRule {
    fn column_type(&self) -> ColumnType {
        ColumnType::Number
    }

    fn expected(&self) -> &'static str {
        "a number or null"
    }

    fn accepts_item(&self, item: &RawItem<'_>) -> bool {
        item.text() == "null" || is_numeric_literal(item.text())
    }

    fn scalar(&self, item: &RawItem<'_>) -> Option<Scalar> {
        if item.text() == "null" {
            return Some(Scalar::Null);
        }
        item.text().parse::<f64>().ok().map(Scalar::Number)
    }

    fn list_item(&self, item: &RawItem<'_>) -> Scalar {
        if item.is_quoted() {
            return Scalar::String(item.unquoted().to_string());
        }
        if item.is_null() {
            return Scalar::Null;
        }
        if let Some(b) = parse_bool(item.text()) {
            return Scalar::Bool(b);
        }
        if is_numeric_literal(item.text()) {
            if let Ok(n) = item.text().parse::<f64>() {
                return Scalar::Number(n);
            }
        }
        Scalar::String(item.text().to_string())
    }
}

impl TypeRule for StringRule {
    fn column_type(&self) -> ColumnType {
        ColumnType::String
    }

    fn expected(&self) -> &'static str {
        "a quoted string or null"
    }

    fn accepts_item(&self, item: &RawItem<'_>) -> bool {
        Fragment::ItemString.matches(item.text())
    }

    fn scalar(&self, item: &RawItem<'_>) -> Option<Scalar> {
        if item.is_quoted() {
            Some(Scalar::String(item.unquoted().to_string()))
        } else if item.text() == "null" {
            Some(Scalar::Null)
        } else {
            None
        }
    }

    fn list_item(&self, item: &RawItem<'_>) -> Scalar {
        if item.is_null() {
            Scalar::Null
        } else {
            Scalar::String(item.unquoted().to_string())
        }
    }
}

impl TypeRule for BooleanRule {
    fn column_type(&self) -> ColumnType {
        ColumnType::Boolean
    }

    fn expected(&self) -> &'static str {
        "true, false or null"
    }

    fn accepts_item(&self, item: &RawItem<'_>) -> bool {
        Fragment::ItemBoolean.matches(item.text())
    }

    fn scalar(&self, item: &RawItem<'_>) -> Option<Scalar> {
        if item.is_null() {
            return Some(Scalar::Null);
        }
        parse_bool(item.text()).map(Scalar::Bool)
    }

    fn list_item(&self, item: &RawItem<'_>) -> Scalar {
        self.scalar(item)
            .unwrap_or_else(|| Scalar::String(item.unquoted().to_string()))
    }
}

/// Is `text` a valid filter over the given columns?
///
/// Empty or whitespace-only text is valid and means "no filter". Any
/// failure, structural or semantic, in any condition makes the whole text
/// invalid.
pub fn validate<S: AsRef<str>>(
    text: &str,
    column_names: &[S],
    column_types: &HashMap<String, ColumnType>,
) -> bool {
    let schema = ColumnSchema::new(
        column_names.iter().map(|name| name.as_ref().to_string()),
        column_types.clone(),
    );

    match check(text, &schema) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("rejected filter {:?}: {}", text, e);
            false
        }
    }
}

/// Like [`validate`], but says what is wrong
pub fn check(text: &str, schema: &ColumnSchema) -> Result<(), FilterError> {
    parse(text, schema).map(|_| ())
}

/// Parse filter text into a structured [`Filter`].
///
/// Accepts exactly the texts [`validate`] accepts. Column names in the
/// result use their declared spelling.
pub fn parse(text: &str, schema: &ColumnSchema) -> Result<Filter, FilterError> {
    let source = text.trim();
    if source.is_empty() {
        return Ok(Filter::default());
    }

    let raw = RawParser::parse_raw_filter(source).map_err(|e| e.with_source(source.to_string()))?;
    log::trace!(
        "{} conditions, {} connectors in {:?}",
        raw.conditions.len(),
        raw.connectors.len(),
        source
    );

    let conditions = raw
        .conditions
        .iter()
        .map(|condition| check_condition(condition, schema, source))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Filter {
        conditions,
        connectors: raw.connectors,
    })
}

fn check_condition(
    condition: &RawCondition<'_>,
    schema: &ColumnSchema,
    source: &str,
) -> Result<Condition, FilterError> {
    let column = condition.variable.to_lowercase();

    let Some(declared) = schema.resolve(&column) else {
        let suggestions = suggest_columns(&column, schema.names());
        return Err(FilterError::UnknownColumn {
            column: condition.variable.to_string(),
            span: condition.variable_span.to_source_span(),
            src: source.to_string(),
            suggestions: (!suggestions.is_empty())
                .then(|| format!("Did you mean: {}?", suggestions.join(", "))),
        });
    };

    let column_type =
        schema
            .column_type(&column)
            .ok_or_else(|| FilterError::MissingColumnType {
                column: declared.to_string(),
                span: condition.variable_span.to_source_span(),
                src: source.to_string(),
            })?;
    let rule = rule_for(column_type);

    let value = match &condition.value {
        RawValue::List(items) => {
            if !rule.accepts_list(condition.operator) {
                return Err(incompatible(condition, declared, column_type, source));
            }
            if !Fragment::ItemMultiple.matches(condition.value_span.as_str()) {
                return Err(invalid_value(
                    "a parenthesized list",
                    condition.value_span,
                    source,
                ));
            }
            Value::List(items.iter().map(|item| rule.list_item(item)).collect())
        }
        RawValue::Single(item) => {
            if !rule.accepts_single(condition.operator) {
                return Err(incompatible(condition, declared, column_type, source));
            }
            let scalar = rule
                .accepts_item(item)
                .then(|| rule.scalar(item))
                .flatten()
                .ok_or_else(|| invalid_value(rule.expected(), item.span, source))?;
            Value::Scalar(scalar)
        }
    };

    Ok(Condition {
        variable: declared.to_string(),
        operator: condition.operator,
        value,
    })
}

fn incompatible(
    condition: &RawCondition<'_>,
    column: &str,
    column_type: ColumnType,
    source: &str,
) -> FilterError {
    let allowed = column_type
        .operator_class()
        .operators()
        .iter()
        .map(Operator::symbol)
        .join(" ");

    FilterError::IncompatibleOperator {
        column: column.to_string(),
        column_type: column_type.to_string(),
        operator: condition.comparator.to_string(),
        operator_span: condition.comparator_span.to_source_span(),
        column_span: condition.variable_span.to_source_span(),
        src: source.to_string(),
        allowed: Some(format!("{} columns accept: {}", column_type, allowed)),
    }
}

fn invalid_value(expected: &str, span: pest::Span<'_>, source: &str) -> FilterError {
    FilterError::InvalidValue {
        expected: expected.to_string(),
        found: span.as_str().to_string(),
        span: span.to_source_span(),
        src: source.to_string(),
    }
}
