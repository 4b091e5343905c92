use std::collections::HashMap;

use filtertext::{
    to_text, validate, ColumnType, Condition, Connector, Filter, Operator, Scalar, Value,
};
use serde_json::json;

fn cond(variable: &str, operator: Operator, value: Value) -> Condition {
    Condition::new(variable, operator, value)
}

fn s(text: &str) -> Scalar {
    Scalar::String(text.to_string())
}

#[test]
fn test_render_simple_filter() {
    let filter = Filter::condition(cond("name", Operator::Eq, Value::Scalar(s("John")))).push(
        Connector::And,
        cond("age", Operator::Gt, Value::Scalar(Scalar::Number(30.0))),
    );
    assert_eq!(to_text(&filter), r#"name = "John" and age > 30"#);
    assert_eq!(filter.to_string(), filter.to_text());
}

#[test]
fn test_render_every_operator_symbol() {
    for op in Operator::ALL {
        let value = if op.is_multi_value() {
            Value::List(vec![Scalar::Number(1.0)])
        } else {
            Value::Scalar(Scalar::Number(1.0))
        };
        let expected = if op.is_multi_value() {
            format!("x {} (1)", op.symbol())
        } else {
            format!("x {} 1", op.symbol())
        };
        assert_eq!(Filter::condition(cond("x", op, value)).to_text(), expected);
    }
}

#[test]
fn test_render_lists_and_scalars() {
    let filter = Filter::condition(cond(
        "race",
        Operator::NotIn,
        Value::List(vec![s("WHITE"), Scalar::Null, Scalar::Number(2.5), Scalar::Bool(true)]),
    ))
    .push(
        Connector::Or,
        cond("active", Operator::Ne, Value::Scalar(Scalar::Bool(false))),
    );

    assert_eq!(
        filter.to_text(),
        r#"race not in ("WHITE", null, 2.5, true) or active != false"#
    );
}

#[test]
fn test_render_empty_and_partial_filters() {
    assert_eq!(Filter::default().to_text(), "");

    // connector missing for the gap
    let filter = Filter {
        conditions: vec![
            cond("a", Operator::Eq, Value::Scalar(Scalar::Number(1.0))),
            cond("b", Operator::Eq, Value::Scalar(Scalar::Number(2.0))),
        ],
        connectors: vec![],
    };
    assert_eq!(filter.to_text(), "a = 1b = 2");

    // trailing connector with no condition after it
    let filter = Filter {
        conditions: vec![cond("a", Operator::Eq, Value::Scalar(Scalar::Number(1.0)))],
        connectors: vec![Connector::And],
    };
    assert_eq!(filter.to_text(), "a = 1");

    // scalar where a list belongs, list where a scalar belongs
    let filter = Filter {
        conditions: vec![
            cond("a", Operator::In, Value::Scalar(s("x"))),
            cond("b", Operator::Eq, Value::List(vec![])),
        ],
        connectors: vec![Connector::Or],
    };
    assert_eq!(filter.to_text(), r#"a in "x" or b = ()"#);

    let filter = Filter::condition(Condition::new("", Operator::Eq, Value::default()));
    assert_eq!(filter.to_text(), "= null");
}

#[test]
fn test_render_legacy_history_entries() {
    let entries = vec![
        (
            json!({
                "conditions": [
                    {"variable": "name", "operator": "starts", "value": "Jo"},
                    {"variable": "age", "operator": "between", "value": 3}
                ],
                "connectors": ["and"]
            }),
            r#"name =: "Jo" and age = 3"#,
        ),
        (json!({"conditions": []}), ""),
        (json!({}), ""),
        (json!([1, 2, 3]), ""),
        (
            json!({"conditions": [{"variable": "x", "value": {"a": 1}}]}),
            "x = null",
        ),
        (
            json!({"conditions": "not a list", "connectors": 5}),
            "",
        ),
    ];

    for (entry, expected) in entries {
        assert_eq!(
            Filter::from_json_lenient(&entry).to_text(),
            expected,
            "entry: {}",
            entry
        );
    }
}

#[test]
fn test_rendered_filter_validates() {
    let names = ["name", "age", "active", "race"];
    let types: HashMap<String, ColumnType> = [
        ("name", ColumnType::String),
        ("age", ColumnType::Number),
        ("active", ColumnType::Boolean),
        ("race", ColumnType::String),
    ]
    .into_iter()
    .map(|(n, t)| (n.to_string(), t))
    .collect();

    let filter = Filter::condition(cond("name", Operator::Regex, Value::Scalar(s("^a.*\"b\""))))
        .push(
            Connector::Or,
            cond("age", Operator::Le, Value::Scalar(Scalar::Null)),
        )
        .push(
            Connector::And,
            cond("active", Operator::Eq, Value::Scalar(Scalar::Bool(true))),
        )
        .push(
            Connector::And,
            cond(
                "race",
                Operator::In,
                Value::List(vec![s("BLACK OR AFRICAN AMERICAN"), s("a, b")]),
            ),
        );

    let text = filter.to_text();
    assert!(validate(&text, &names, &types), "rejected: {}", text);
}
