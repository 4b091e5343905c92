use crate::filter::Connector;
use crate::operator::Operator;

/// Lexical class of a literal, decided by the grammar rule that matched it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Quoted literal or the bare word `null`
    String,
    /// `true`, `false` or `null` in any case
    Boolean,
    /// Any other bare token
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawItem<'a> {
    pub kind: ItemKind,
    pub span: pest::Span<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<'a> {
    Single(RawItem<'a>),
    List(Vec<RawItem<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCondition<'a> {
    pub variable: &'a str,
    pub comparator: &'a str,
    pub operator: Operator,
    pub value: RawValue<'a>,
    pub span: pest::Span<'a>,
    // Subcomponent spans for precise error reporting
    pub variable_span: pest::Span<'a>,
    pub comparator_span: pest::Span<'a>,
    pub value_span: pest::Span<'a>,
}

/// Structurally valid filter text, not yet checked against any columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFilter<'a> {
    pub conditions: Vec<RawCondition<'a>>,
    pub connectors: Vec<Connector>,
}

impl<'a> RawItem<'a> {
    /// Token text exactly as written, quotes included
    pub fn text(&self) -> &'a str {
        self.span.as_str()
    }

    pub fn is_quoted(&self) -> bool {
        self.text().starts_with(['"', '\''])
    }

    /// Token text with surrounding quotes removed
    pub fn unquoted(&self) -> &'a str {
        let text = self.text();
        if self.is_quoted() && text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            text
        }
    }

    pub fn is_null(&self) -> bool {
        !self.is_quoted() && self.text().eq_ignore_ascii_case("null")
    }
}

impl<'a> RawValue<'a> {
    pub fn items(&self) -> &[RawItem<'a>] {
        match self {
            RawValue::Single(item) => std::slice::from_ref(item),
            RawValue::List(items) => items,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, RawValue::List(_))
    }
}

impl<'a> RawCondition<'a> {
    /// Convert to test-friendly condition without spans
    pub fn to_test_condition(&self) -> test_utils::RawTestCondition<'a> {
        test_utils::RawTestCondition {
            variable: self.variable,
            operator: self.operator,
            value: match &self.value {
                RawValue::Single(item) => test_utils::RawTestValue::Single(item.text()),
                RawValue::List(items) => {
                    test_utils::RawTestValue::List(items.iter().map(RawItem::text).collect())
                }
            },
        }
    }
}

impl<'a> RawFilter<'a> {
    pub fn to_test_conditions(&self) -> Vec<test_utils::RawTestCondition<'a>> {
        self.conditions
            .iter()
            .map(RawCondition::to_test_condition)
            .collect()
    }
}

pub mod test_utils {
    use crate::operator::Operator;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RawTestCondition<'a> {
        pub variable: &'a str,
        pub operator: Operator,
        pub value: RawTestValue<'a>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RawTestValue<'a> {
        Single(&'a str),
        List(Vec<&'a str>),
    }

    impl<'a> RawTestCondition<'a> {
        /// Helper constructor for a scalar condition
        pub fn single(variable: &'a str, operator: Operator, value: &'a str) -> Self {
            Self {
                variable,
                operator,
                value: RawTestValue::Single(value),
            }
        }

        /// Helper constructor for a list condition
        pub fn list(variable: &'a str, operator: Operator, values: Vec<&'a str>) -> Self {
            Self {
                variable,
                operator,
                value: RawTestValue::List(values),
            }
        }
    }
}
