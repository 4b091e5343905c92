use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use super::{
    ast::{ItemKind, RawCondition, RawFilter, RawItem, RawValue},
    error::FilterError,
};
use crate::{filter::Connector, operator::Operator};

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct RawParser;

impl RawParser {
    /// Parse filter text into its conditions and connectors.
    ///
    /// Surrounding whitespace is ignored. Empty input is not a filter; callers
    /// that treat it as "no filter" check for it first.
    pub fn parse_raw_filter(input: &str) -> Result<RawFilter<'_>, FilterError> {
        let mut pairs = Self::parse(Rule::filter, input)
            .map_err(|e| FilterError::from_pest(Box::new(e), input.to_string()))?;

        let filter_pair = pairs
            .next()
            .ok_or_else(|| FilterError::internal("Grammar guarantees filter exists"))?;

        let mut raw = RawFilter::default();
        let mut consumed = 0;

        for pair in filter_pair.into_inner() {
            match pair.as_rule() {
                Rule::condition => {
                    // each condition must end strictly after the previous one
                    let end = pair.as_span().end();
                    if end <= consumed {
                        return Err(FilterError::internal(format!(
                            "condition extraction stalled at byte {}",
                            consumed
                        ))
                        .with_source(input.to_string()));
                    }
                    consumed = end;

                    let condition = Self::parse_condition(pair)?;
                    log::trace!("extracted condition {:?}", condition.span.as_str());
                    raw.conditions.push(condition);
                }
                Rule::connector => {
                    let connector = Connector::from_keyword(pair.as_str()).ok_or_else(|| {
                        FilterError::internal(format!("Unexpected connector: {}", pair.as_str()))
                    })?;
                    raw.connectors.push(connector);
                }
                Rule::EOI => {}
                rule => {
                    return Err(FilterError::internal(format!(
                        "Unexpected filter rule: {:?}",
                        rule
                    )))
                }
            }
        }

        if raw.connectors.len() + 1 != raw.conditions.len() {
            return Err(FilterError::internal(format!(
                "{} conditions joined by {} connectors",
                raw.conditions.len(),
                raw.connectors.len()
            )));
        }

        Ok(raw)
    }

    /// Parse exactly one condition, e.g. `age >= 21`
    pub fn parse_raw_condition(input: &str) -> Result<RawCondition<'_>, FilterError> {
        let pair = Self::parse(Rule::condition_only, input)
            .map_err(|e| FilterError::from_pest(Box::new(e), input.to_string()))?
            .next()
            .and_then(|p| p.into_inner().next())
            .ok_or_else(|| FilterError::internal("Grammar guarantees condition exists"))?;

        Self::parse_condition(pair)
    }

    fn parse_condition(pair: Pair<'_, Rule>) -> Result<RawCondition<'_>, FilterError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();

        let variable_pair = inner
            .next()
            .ok_or_else(|| FilterError::internal("Grammar guarantees condition has variable"))?;

        let comparator_pair = inner
            .next()
            .ok_or_else(|| FilterError::internal("Grammar guarantees condition has comparator"))?;
        let comparator = comparator_pair.as_str();

        let value_pair = inner
            .next()
            .ok_or_else(|| FilterError::internal("Grammar guarantees condition has value"))?;
        let value_span = value_pair.as_span();

        // the two branches pair comparator and value shapes
        let value = match (comparator_pair.as_rule(), value_pair.as_rule()) {
            (Rule::comparator_single, _) => RawValue::Single(Self::parse_item(value_pair)?),
            (Rule::comparator_multiple, Rule::item_multiple) => RawValue::List(
                value_pair
                    .into_inner()
                    .map(Self::parse_item)
                    .collect::<Result<_, _>>()?,
            ),
            (comparator_rule, value_rule) => {
                return Err(FilterError::internal(format!(
                    "Unexpected condition shape: {:?} followed by {:?}",
                    comparator_rule, value_rule
                )))
            }
        };

        Ok(RawCondition {
            variable: variable_pair.as_str(),
            comparator,
            operator: Operator::for_symbol(comparator),
            value,
            span,
            variable_span: variable_pair.as_span(),
            comparator_span: comparator_pair.as_span(),
            value_span,
        })
    }

    fn parse_item(pair: Pair<'_, Rule>) -> Result<RawItem<'_>, FilterError> {
        let kind = match pair.as_rule() {
            Rule::item_string => ItemKind::String,
            Rule::item_boolean => ItemKind::Boolean,
            Rule::item_number => ItemKind::Number,
            rule => {
                return Err(FilterError::internal(format!(
                    "Unexpected item rule: {:?}",
                    rule
                )))
            }
        };

        Ok(RawItem {
            kind,
            span: pair.as_span(),
        })
    }
}
