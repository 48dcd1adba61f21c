use rowsift::accessor::{SetterSpec, TranslatorSpec, compile_translators};
use rowsift::error::SiftError;
use rowsift::translate::{translate, translate_one};
use serde_json::{Map, Value, json};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn source() -> Value {
    json!({
        "k1": "v1",
        "k2": {"k21": "v21"},
        "name": {"first": "john", "last": "doe"},
        "age": 24
    })
}

#[test]
fn getter_setter_round_trip_through_nested_paths() {
    let translators = compile_translators(vec![TranslatorSpec::new(["k2", "k21"])]);
    let out = translate(&source(), &translators);
    assert_eq!(out, json!({"k2": {"k21": "v21"}}));
}

#[test]
fn omitted_setter_reuses_the_getter_destination() {
    let translators = compile_translators(vec![
        TranslatorSpec::new("age"),
        TranslatorSpec::new(["name", "last"]),
    ]);
    let out = translate(&source(), &translators);
    assert_eq!(out, json!({"age": 24, "name": {"last": "doe"}}));
}

#[test]
fn setter_keys_reshape_extracted_values() {
    let translators = compile_translators(vec![
        TranslatorSpec::new(["name", "last"]).to("lastname"),
        TranslatorSpec::new("age").to(["person", "age"]),
    ]);
    let out = translate(&source(), &translators);
    assert_eq!(out, json!({"lastname": "doe", "person": {"age": 24}}));
}

#[test]
fn setter_functions_see_the_source_for_context() {
    let translators = compile_translators(vec![TranslatorSpec::new(["name", "first"]).to(
        SetterSpec::func(|target, value, source| {
            let full = format!(
                "{} {}",
                value.as_str().unwrap_or(""),
                source["name"]["last"].as_str().unwrap_or("")
            );
            if let Value::Object(map) = target {
                map.insert("full".to_owned(), json!(full.clone()));
            }
            Ok(json!(full))
        }),
    )]);
    let out = translate(&source(), &translators);
    assert_eq!(out, json!({"full": "john doe"}));
}

#[test]
fn a_failing_setter_leaves_the_destination_partial() {
    init_logging();
    let translators = compile_translators(vec![
        TranslatorSpec::new("k1"),
        TranslatorSpec::new("age").to(SetterSpec::func(|_, _, _| {
            Err(SiftError::Setter("refused".to_owned()))
        })),
        TranslatorSpec::new(["name", "last"]).to("lastname"),
    ]);
    let out = translate(&source(), &translators);
    // the first pair landed, the failure aborted the rest, no rollback
    assert_eq!(out, json!({"k1": "v1"}));
}

#[test]
fn translate_one_accumulates_into_an_existing_destination() {
    let translators = compile_translators(vec![TranslatorSpec::new("k1")]);
    let mut destination = json!({"existing": true});
    translate_one(&source(), &mut destination, &translators);
    assert_eq!(destination, json!({"existing": true, "k1": "v1"}));
}

#[test]
fn missing_sources_translate_to_null_fields() {
    let translators = compile_translators(vec![TranslatorSpec::new("not_there")]);
    let out = translate(&source(), &translators);
    assert_eq!(out, json!({"not_there": null}));
}

#[test]
fn empty_translator_batch_yields_the_empty_mapping() {
    let out = translate(&source(), &[]);
    assert_eq!(out, Value::Object(Map::new()));
}
