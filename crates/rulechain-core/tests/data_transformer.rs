//! Integration tests for batch transformation of data mappings

use pretty_assertions::assert_eq;
use rulechain_core::{
    DataTransformer, Error, Flow, Map, RuleMap, StepSpec, TransformContext, Value,
};
use serde_json::json;

fn to_map(json: serde_json::Value) -> Map {
    match Value::from(json) {
        Value::Map(map) => map,
        other => panic!("expected a map, got {}", other.type_name()),
    }
}

fn sample_data() -> Map {
    to_map(json!({
        "first_name": "    jim    ",
        "last_name": "   thompson",
        "date_of_birth": "2020-05-24",
        "password": "abcdefgh12345",
        "favorite_number": "24",
        "favorite_date": null,
        "get_notifications": true,
        "contact_info": {
            "address": "123 some lane street",
            "home_phone": "123-456-7890",
            "cell_phone": "123-456-7890",
            "apartment_number": "12B",
            "email": "email@example.com"
        }
    }))
}

fn context() -> TransformContext {
    TransformContext::with_builtins()
}

#[test]
fn empty_rules_leave_data_unchanged() {
    let data = sample_data();
    let result = context().transform_data(data.clone(), RuleMap::new()).unwrap();
    assert_eq!(result, data);
}

#[test]
fn applies_rules_to_named_keys() {
    let rules = RuleMap::new()
        .rule("first_name", "trim|ucfirst")
        .rule("favorite_number", "intval");

    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["first_name"], Value::from("Jim"));
    assert_eq!(result["favorite_number"], Value::Int(24));
    assert_eq!(result["last_name"], Value::from("   thompson"));
}

#[test]
fn unknown_function_fails_the_batch() {
    let rules = RuleMap::new().rule("first_name", "trim|not_a_function");
    let err = context().transform_data(sample_data(), rules).unwrap_err();
    assert!(matches!(&err, Error::NotCallable { name } if name == "not_a_function"));
}

#[test]
fn password_keeps_only_digits() {
    let rules = RuleMap::new().rule("password", "trim|strip_non_digits:value:");
    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["password"], Value::from("12345"));
    assert_eq!(result["first_name"], Value::from("    jim    "));
}

#[test]
fn closures_and_blank_marker() {
    let rules = RuleMap::new().rule(
        "favorite_date",
        vec![
            StepSpec::closure(|_| Ok(Flow::Continue(Value::Null))),
            StepSpec::from("?"),
            StepSpec::from("->format:m/d/Y"),
        ],
    );

    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["favorite_date"], Value::Null);
}

#[test]
fn delegates_to_date_objects() {
    let rules = RuleMap::new().rule("date_of_birth", "trim|Date|->addDays:1|->format:m/d/Y");
    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["date_of_birth"], Value::from("05/25/2020"));
}

#[test]
fn wildcard_keys() {
    let rules = RuleMap::new().rule("*name*", "trim|ucfirst");
    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["first_name"], Value::from("Jim"));
    assert_eq!(result["last_name"], Value::from("Thompson"));
}

#[test]
fn nested_keys_with_dot_notation() {
    let rules = RuleMap::new()
        .rule(
            "contact_info.address",
            vec![
                StepSpec::from("Text"),
                StepSpec::from("->after:123 "),
                StepSpec::from("->toString"),
            ],
        )
        .rule("contact_info.home_phone", "regex_replace:[^0-9],,:value:")
        .rule("contact_info.cell_phone", "regex_replace:[^0-9],,:value:")
        .rule("contact_info.apartment_number", "replace:B,A,:value:")
        .rule("contact_info.email", "replace:example,gmail,:value:");

    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(
        result["contact_info"],
        Value::from(json!({
            "address": "some lane street",
            "home_phone": "1234567890",
            "cell_phone": "1234567890",
            "apartment_number": "12A",
            "email": "email@gmail.com"
        }))
    );
}

#[test]
fn wildcard_keys_on_nested_data() {
    let rules = RuleMap::new().rule("contact_info.*phone*", "regex_replace:[^0-9],,:value:");
    let result = context().transform_data(sample_data(), rules).unwrap();

    let contact = result["contact_info"].as_map().unwrap();
    assert_eq!(contact["home_phone"], Value::from("1234567890"));
    assert_eq!(contact["cell_phone"], Value::from("1234567890"));
    assert_eq!(contact["email"], Value::from("email@example.com"));
}

#[test]
fn missing_keys_are_skipped() {
    let rules = RuleMap::new()
        .rule("middle_name", "not_a_function")
        .rule("contact_info.fax", "trim");

    let data = sample_data();
    let result = context().transform_data(data.clone(), rules).unwrap();
    assert_eq!(result, data);
}

#[test]
fn list_elements_by_index() {
    let data = to_map(json!({"tags": [" a ", " b "], "nested": {"items": [{"name": " x "}]}}));
    let rules = RuleMap::new()
        .rule("tags.1", "trim|uppercase")
        .rule("nested.items.*.name", "trim");

    let result = context().transform_data(data, rules).unwrap();
    assert_eq!(result["tags"], Value::from(json!([" a ", "B"])));
    assert_eq!(result["nested"], Value::from(json!({"items": [{"name": "x"}]})));
}

#[test]
fn rules_for_the_same_key_run_in_order() {
    let rules = RuleMap::new()
        .rule("first_name", "trim")
        .rule("*_name", "uppercase");

    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["first_name"], Value::from("JIM"));
    assert_eq!(result["last_name"], Value::from("   THOMPSON"));
}

#[test]
fn guard_receives_field_names() {
    let context = TransformContext::builder()
        .with_builtins()
        .guard(|_, _, field| field != Some("password"))
        .build()
        .unwrap();

    let rules = RuleMap::new().rule("first_name", "trim").rule("password", "uppercase");
    let err = context.transform_data(sample_data(), rules).unwrap_err();
    assert!(matches!(
        err,
        Error::ExecutionNotAllowed { ref name, field: Some(ref field) }
            if name == "uppercase" && field == "password"
    ));
}

#[test]
fn rules_deserialize_from_json() {
    let rules: RuleMap = serde_json::from_value(json!({
        "first_name": "trim|ucfirst",
        "favorite_number": ["trim", ["to_int"]],
        "contact_info.*phone*": "strip_non_digits"
    }))
    .unwrap();
    assert_eq!(rules.len(), 3);

    let result = context().transform_data(sample_data(), rules).unwrap();
    assert_eq!(result["first_name"], Value::from("Jim"));
    assert_eq!(result["favorite_number"], Value::Int(24));
    assert_eq!(
        result["contact_info"].as_map().unwrap()["cell_phone"],
        Value::from("1234567890")
    );
}

#[test]
fn data_transformer_can_be_reused() {
    let mut transformer = DataTransformer::create(
        &context(),
        to_map(json!({"a": " x "})),
        RuleMap::new().rule("a", "trim"),
    );
    assert_eq!(transformer.transform().unwrap()["a"], Value::from("x"));

    transformer
        .set_data(to_map(json!({"a": "y"})))
        .set_functions(RuleMap::new().rule("a", "uppercase"));
    assert_eq!(transformer.functions().len(), 1);
    assert_eq!(transformer.transform().unwrap()["a"], Value::from("Y"));
}
