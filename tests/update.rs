use rstest::rstest;

use lazyjson::{Parser, ValueType};

#[rstest]
fn test_object_set_then_get() {
    let mut parser = Parser::new();
    let value = parser.parse(r#"{"a":1,"b":[2,3]}"#).unwrap();
    let object = value.get_object(&[]).unwrap();

    let item = value.get(&["b", "0"]).unwrap();
    object.set("c", item);
    assert_eq!(value.get_i64(&["c"]), 2);

    // Existing keys update in place and keep their position.
    object.set("a", value.true_value());
    assert!(value.get_bool(&["a"]));
    assert_eq!(value.to_string(), r#"{"a":true,"b":[2,3],"c":2}"#);
}

#[rstest]
fn test_object_set_null_uses_singleton() {
    let mut parser = Parser::new();
    let value = parser.parse(r#"{"a":1}"#).unwrap();
    value.set("a", value.null_value());
    assert_eq!(value.get(&["a"]).unwrap().value_type(), ValueType::Null);
    assert_eq!(value.to_string(), r#"{"a":null}"#);
}

#[rstest]
fn test_object_set_updates_first_duplicate_only() {
    // Parsing keeps duplicate keys; set touches the first match only.
    let mut parser = Parser::new();
    let value = parser.parse(r#"{"k":1,"k":2}"#).unwrap();
    let object = value.get_object(&[]).unwrap();

    object.set("k", value.false_value());
    let mut seen = Vec::new();
    object.visit(|key, v| seen.push((key.to_string(), v.to_string())));
    assert_eq!(
        seen,
        vec![
            ("k".to_string(), "false".to_string()),
            ("k".to_string(), "2".to_string())
        ]
    );
}

#[rstest]
fn test_object_del_preserves_order() {
    let mut parser = Parser::new();
    let value = parser.parse(r#"{"a":1,"b":2,"c":3}"#).unwrap();
    value.del("b");
    assert_eq!(value.to_string(), r#"{"a":1,"c":3}"#);
    assert!(!value.exists(&["b"]));

    // Deleting a missing key is a no-op.
    value.del("missing");
    assert_eq!(value.to_string(), r#"{"a":1,"c":3}"#);
}

#[rstest]
fn test_object_set_then_del_then_get_absent() {
    let mut parser = Parser::new();
    let value = parser.parse("{}").unwrap();
    let object = value.get_object(&[]).unwrap();

    object.set("k", value.true_value());
    assert!(object.get("k").is_some());
    object.del("k");
    assert!(object.get("k").is_none());
    assert!(object.is_empty());
}

#[rstest]
fn test_object_del_with_escaped_key() {
    let mut parser = Parser::new();
    let value = parser.parse(r#"{"a\nb":1,"x":2}"#).unwrap();
    // The needle is the logical key, which only matches after the slow
    // path unescapes the stored keys.
    value.del("a\nb");
    assert!(!value.exists(&["x", "missing"]));
    assert_eq!(value.get_object(&[]).unwrap().len(), 1);
    assert_eq!(value.get_i64(&["x"]), 2);
}

#[rstest]
fn test_array_del_by_index() {
    let mut parser = Parser::new();
    let value = parser.parse("[10,20,30]").unwrap();
    value.del("1");
    assert_eq!(value.to_string(), "[10,30]");

    value.del("5");
    assert_eq!(value.to_string(), "[10,30]");
    value.del("x");
    assert_eq!(value.to_string(), "[10,30]");
}

#[rstest]
fn test_set_array_item_extends_with_nulls() {
    let mut parser = Parser::new();
    let value = parser.parse("[1]").unwrap();
    value.set_array_item(3, value.true_value());
    assert_eq!(value.to_string(), "[1,null,null,true]");

    value.set_array_item(0, value.false_value());
    assert_eq!(value.to_string(), "[false,null,null,true]");
}

#[rstest]
fn test_value_set_on_array_parses_index() {
    let mut parser = Parser::new();
    let value = parser.parse("[1,2]").unwrap();
    value.set("1", value.null_value());
    assert_eq!(value.to_string(), "[1,null]");

    // Non-numeric and negative keys are ignored.
    value.set("x", value.true_value());
    value.set("-1", value.true_value());
    assert_eq!(value.to_string(), "[1,null]");
}

#[rstest]
fn test_set_on_scalar_is_ignored() {
    let mut parser = Parser::new();
    let value = parser.parse("42").unwrap();
    value.set("k", value.null_value());
    value.del("k");
    assert_eq!(value.to_string(), "42");
}

#[rstest]
fn test_set_value_from_same_tree_aliases() {
    let mut parser = Parser::new();
    let value = parser.parse(r#"{"src":{"x":1},"dst":null}"#).unwrap();
    let src = value.get(&["src"]).unwrap();
    value.set("dst", src);
    assert_eq!(value.get_i64(&["dst", "x"]), 1);
    assert_eq!(value.to_string(), r#"{"src":{"x":1},"dst":{"x":1}}"#);
}
