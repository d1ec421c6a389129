use mimeo::construct::Value;
use mimeo::walker::{clone_iterative, clone_recursive};

// Every walker must agree on primitives, so each case runs through both.
fn both(value: &Value) -> Vec<Value> {
    vec![
        clone_recursive(value).expect("recursive clone ok"),
        clone_iterative(value).expect("iterative clone ok"),
    ]
}

#[test]
fn numbers_pass_through() {
    for clone in both(&Value::number(42.0)) {
        assert!(clone.is_identical(&Value::number(42.0)));
    }
}

#[test]
fn text_passes_through() {
    let text = Value::text("Hello, World!");
    for clone in both(&text) {
        assert!(clone.is_identical(&text));
    }
}

#[test]
fn null_passes_through() {
    for clone in both(&Value::Null) {
        assert!(matches!(clone, Value::Null));
    }
}

#[test]
fn booleans_pass_through() {
    for clone in both(&Value::Bool(true)) {
        assert!(clone.is_identical(&Value::Bool(true)));
    }
    for clone in both(&Value::Bool(false)) {
        assert!(!clone.is_identical(&Value::Bool(true)));
    }
}

#[test]
fn symbols_pass_through_as_the_same_token() {
    let symbol = Value::symbol("token");
    for clone in both(&symbol) {
        assert!(clone.is_identical(&symbol));
    }
    // a different name is a different token
    for clone in both(&Value::symbol("other")) {
        assert!(!clone.is_identical(&symbol));
    }
}

#[test]
fn same_value_rules_for_numbers() {
    let nan = Value::number(f64::NAN);
    for clone in both(&nan) {
        assert!(clone.is_identical(&nan), "NaN equals itself under same-value rules");
    }
    assert!(Value::number(0.0).is_identical(&Value::number(-0.0)));
}
