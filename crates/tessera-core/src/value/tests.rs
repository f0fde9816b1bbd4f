use crate::value::Value;
use std::cmp::Ordering;

// ---- helpers -----------------------------------------------------------

fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

// ---- conversion --------------------------------------------------------

#[test]
fn from_option_maps_none_to_null() {
    assert_eq!(Value::from(None::<&str>), Value::Null);
    assert_eq!(Value::from(Some("John")), v_txt("John"));
}

#[test]
fn small_integers_widen_into_int_and_uint() {
    assert_eq!(Value::from(7i8), Value::Int(7));
    assert_eq!(Value::from(7u16), Value::Uint(7));
    assert_eq!(Value::from(u128::MAX), Value::Uint128(u128::MAX));
}

#[test]
fn tuple_collects_in_order() {
    let v = Value::tuple(["John", "Lennon"]);

    assert_eq!(v.as_list(), Some(&[v_txt("John"), v_txt("Lennon")][..]));
    assert_eq!(v.label(), "list");
}

// ---- display -----------------------------------------------------------

#[test]
fn display_renders_tuples_and_blobs() {
    let v = Value::List(vec![v_txt("John"), Value::Null, Value::Blob(vec![0xde, 0xad])]);

    assert_eq!(v.to_string(), "(John, NULL, 0xdead)");
}

#[test]
fn display_of_empty_tuple() {
    assert_eq!(Value::List(Vec::new()).to_string(), "()");
}

// ---- ordering ----------------------------------------------------------

#[test]
fn null_sorts_first() {
    assert_eq!(Value::Null.cmp(&Value::Int(i64::MIN)), Ordering::Less);
    assert_eq!(Value::Null.cmp(&v_txt("")), Ordering::Less);
}

#[test]
fn lists_compare_lexicographically() {
    let a = Value::tuple(["George", "Best"]);
    let b = Value::tuple(["George", "Harrison"]);
    let c = Value::tuple(["George"]);

    assert!(a < b);
    assert!(c < a, "a strict prefix sorts before the longer tuple");
}

// ---- serde -------------------------------------------------------------

#[test]
fn json_shape_is_externally_tagged() {
    let json = serde_json::to_string(&Value::tuple([1i64, 2i64])).expect("serialize");

    assert_eq!(json, r#"{"List":[{"Int":1},{"Int":2}]}"#);

    let back: Value = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, Value::tuple([1i64, 2i64]));
}

#[test]
fn null_and_text_accessors() {
    assert!(Value::Null.is_null());
    assert!(!v_txt("x").is_null());
    assert_eq!(v_txt("x").as_text(), Some("x"));
    assert_eq!(Value::Int(1).as_text(), None);
}
