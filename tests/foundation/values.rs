//! Integration tests for Value parsing and conversion

use trogdor_foundation::{Value, ValueType};

#[test]
fn parse_by_type() {
    assert_eq!(Value::parse(" 42 ", ValueType::Int), Some(Value::Int(42)));
    assert_eq!(Value::parse("4.5", ValueType::Int), None);
    assert_eq!(Value::parse("3", ValueType::Float), Some(Value::Float(3.0)));
    assert_eq!(Value::parse("inf", ValueType::Float), None);
    assert_eq!(Value::parse("1", ValueType::Bool), Some(Value::Bool(true)));
    assert_eq!(Value::parse("yes", ValueType::Bool), None);
    assert_eq!(
        Value::parse("  hello ", ValueType::String),
        Some(Value::String("hello".to_string()))
    );
}

#[test]
fn accessors() {
    assert_eq!(Value::Int(7).as_float(), Some(7.0));
    assert_eq!(Value::Float(0.5).as_int(), None);
    assert_eq!(Value::from("north").as_str(), Some("north"));
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert_eq!(Value::from(3i64).value_type(), ValueType::Int);
}

#[test]
fn display_matches_source_form() {
    assert_eq!(Value::Bool(false).to_string(), "0");
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::from("a rock").to_string(), "a rock");
}
