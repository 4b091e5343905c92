use std::collections::HashMap;

use proptest::prelude::*;

use crate::filter::{Condition, Connector, Filter, Scalar, Value};
use crate::operator::{Operator, OperatorClass};
use crate::schema::{ColumnSchema, ColumnType};
use crate::validator::{parse, validate};

const COLUMNS: [(&str, ColumnType); 4] = [
    ("name", ColumnType::String),
    ("City_Name", ColumnType::String),
    ("age", ColumnType::Number),
    ("active", ColumnType::Boolean),
];

fn schema() -> ColumnSchema {
    let mut schema = ColumnSchema::default();
    for (name, ty) in COLUMNS {
        schema.insert(name, ty);
    }
    schema
}

fn type_map() -> HashMap<String, ColumnType> {
    COLUMNS
        .iter()
        .map(|(name, ty)| (name.to_lowercase(), *ty))
        .collect()
}

// Strings without both quote kinds, so the renderer can always pick one
fn valid_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 _.,()=<>!?:~-]*",
        "[a-zA-Z \"]*",
        "[a-zA-Z ']*",
        Just("and or".to_string()),
        Just("null".to_string()),
    ]
}

// Finite numbers whose shortest decimal form is a plain literal
fn valid_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-100_000i64..100_000).prop_map(|n| n as f64),
        (-10_000i64..10_000).prop_map(|n| n as f64 / 4.0),
    ]
}

fn string_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        4 => valid_string().prop_map(Scalar::String),
        1 => Just(Scalar::Null),
    ]
}

fn number_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        4 => valid_number().prop_map(Scalar::Number),
        1 => Just(Scalar::Null),
    ]
}

fn boolean_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<bool>().prop_map(Scalar::Bool),
        Just(Scalar::Null),
    ]
}

fn single_operator(class: OperatorClass) -> impl Strategy<Value = Operator> {
    let ops: Vec<Operator> = class
        .operators()
        .into_iter()
        .filter(|op| !op.is_multi_value())
        .collect();
    prop::sample::select(ops)
}

fn multi_operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(vec![Operator::In, Operator::NotIn])
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        ("name|City_Name", single_operator(OperatorClass::String), string_scalar())
            .prop_map(|(v, op, s)| Condition::new(v, op, Value::Scalar(s))),
        (
            "name|City_Name",
            multi_operator(),
            prop::collection::vec(string_scalar(), 1..4)
        )
            .prop_map(|(v, op, xs)| Condition::new(v, op, Value::List(xs))),
        (single_operator(OperatorClass::Number), number_scalar())
            .prop_map(|(op, s)| Condition::new("age", op, Value::Scalar(s))),
        (multi_operator(), prop::collection::vec(number_scalar(), 1..4))
            .prop_map(|(op, xs)| Condition::new("age", op, Value::List(xs))),
        (single_operator(OperatorClass::Boolean), boolean_scalar())
            .prop_map(|(op, s)| Condition::new("active", op, Value::Scalar(s))),
    ]
}

fn arb_connector() -> impl Strategy<Value = Connector> {
    prop_oneof![Just(Connector::And), Just(Connector::Or)]
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    (
        arb_condition(),
        prop::collection::vec((arb_connector(), arb_condition()), 0..5),
    )
        .prop_map(|(first, rest)| {
            rest.into_iter()
                .fold(Filter::condition(first), |f, (c, cond)| f.push(c, cond))
        })
}

proptest! {
    #[test]
    fn rendered_filters_validate(filter in arb_filter()) {
        let text = filter.to_text();
        let names: Vec<&str> = COLUMNS.iter().map(|(name, _)| *name).collect();
        prop_assert!(validate(&text, &names, &type_map()), "rejected: {}", text);
    }

    #[test]
    fn rendered_filters_parse_back(filter in arb_filter()) {
        let text = filter.to_text();
        let parsed = parse(&text, &schema());
        prop_assert_eq!(parsed.ok(), Some(filter), "text: {}", text);
    }

    #[test]
    fn extraction_yields_one_condition_per_clause(filter in arb_filter()) {
        let text = filter.to_text();
        let raw = crate::parser::RawParser::parse_raw_filter(&text).unwrap();
        prop_assert_eq!(raw.conditions.len(), filter.conditions.len());

        let ends: Vec<usize> = raw.conditions.iter().map(|c| c.span.end()).collect();
        prop_assert!(ends.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,60}") {
        let names = ["name", "age", "active"];
        let _ = validate(&text, &names, &type_map());
    }

    #[test]
    fn lenient_rendering_never_panics(json in arb_json()) {
        let _ = Filter::from_json_lenient(&json).to_text();
    }
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    use serde_json::{json, Value as Json};

    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z\"' ]{0,8}".prop_map(Json::String),
    ];

    let value = leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Json::Array),
            prop::collection::hash_map("[a-z]{1,5}", inner, 0..4)
                .prop_map(|m| Json::Object(m.into_iter().collect())),
        ]
    });

    let condition = (
        prop::option::of("[a-zA-Z_]{0,6}"),
        prop::option::of("[a-z]{0,8}"),
        prop::option::of(value.clone()),
    )
        .prop_map(|(variable, operator, value)| {
            let mut obj = serde_json::Map::new();
            if let Some(v) = variable {
                obj.insert("variable".into(), Json::String(v));
            }
            if let Some(o) = operator {
                obj.insert("operator".into(), Json::String(o));
            }
            if let Some(v) = value {
                obj.insert("value".into(), v);
            }
            Json::Object(obj)
        });

    prop_oneof![
        value,
        (
            prop::collection::vec(condition, 0..4),
            prop::collection::vec(prop_oneof![Just("and"), Just("or"), Just("xor")], 0..4)
        )
            .prop_map(|(conditions, connectors)| json!({
                "conditions": conditions,
                "connectors": connectors,
            })),
    ]
}
