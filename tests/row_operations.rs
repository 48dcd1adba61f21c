use rowsift::accessor::{Getter, GetterSpec, TranslatorSpec, compile_translators};
use rowsift::rows::{self, DedupMode};
use serde_json::{Value, json};

fn getter(spec: impl Into<GetterSpec>) -> Getter {
    Getter::compile(spec.into())
}

fn crew() -> Value {
    json!([
        {"id": "a", "sex": "m", "name": {"first": "john", "last": "posh"}},
        {"id": "b", "sex": "f", "name": {"first": "liza", "last": "caine"}},
        {"id": "c", "sex": "m", "name": {"first": "tony", "last": "posh"}}
    ])
}

#[test]
fn extract_produces_one_value_sequence_per_row() {
    let getters = [getter("id"), getter(["name", "last"])];
    let out = rows::extract(&crew(), &getters);
    assert_eq!(out, json!([["a", "posh"], ["b", "caine"], ["c", "posh"]]));
}

#[test]
fn extract_on_a_mapping_keeps_its_keys() {
    let keyed = json!({"x": {"id": "a"}, "y": {"id": "b"}});
    let out = rows::extract(&keyed, &[getter("id")]);
    assert_eq!(out, json!({"x": ["a"], "y": ["b"]}));
}

#[test]
fn group_by_partitions_rows_by_derived_key() {
    let grouped = rows::group_by(crew(), &getter("sex"));
    assert_eq!(
        grouped,
        json!({
            "m": [
                {"id": "a", "sex": "m", "name": {"first": "john", "last": "posh"}},
                {"id": "c", "sex": "m", "name": {"first": "tony", "last": "posh"}}
            ],
            "f": [
                {"id": "b", "sex": "f", "name": {"first": "liza", "last": "caine"}}
            ]
        })
    );
    // bucket order follows first occurrence of each distinct key
    let keys: Vec<&String> = grouped.as_object().expect("mapping").keys().collect();
    assert_eq!(keys, ["m", "f"]);
}

#[test]
fn group_by_is_a_partition() {
    let input = crew();
    let total = input.as_array().expect("seq").len();
    let grouped = rows::group_by(input.clone(), &getter("sex"));
    let mut seen = 0;
    for bucket in grouped.as_object().expect("mapping").values() {
        for row in bucket.as_array().expect("bucket") {
            assert!(input.as_array().expect("seq").contains(row));
            seen += 1;
        }
    }
    assert_eq!(seen, total, "every row lands in exactly one bucket");
}

#[test]
fn tally_counts_rows_sharing_a_derived_key() {
    // rows keyed by id, tallied over a deep path
    let keyed = json!({
        "a": {"name": {"last": "posh"}},
        "b": {"name": {"last": "caine"}},
        "c": {"name": {"last": "posh"}}
    });
    let tallied = rows::tally(&keyed, &getter(["name", "last"]));
    assert_eq!(tallied, json!({"posh": 2, "caine": 1}));
}

#[test]
fn union_keeps_rows1_and_only_novel_rows2() {
    let rows1 = json!([
        {"name": {"first": "john", "last": "doe"}, "age": 24},
        {"name": {"first": "liza", "last": "lee"}, "age": 27}
    ]);
    let rows2 = json!([
        {"name": {"first": "john", "last": "new"}, "age": 48},
        {"name": {"first": "tina", "last": "six"}, "age": 50}
    ]);
    let merged = rows::union(rows1.clone(), &rows2, &getter(["name", "first"]));
    let merged = merged.as_array().expect("sequence result");
    assert_eq!(merged.len(), 3);
    // rows1 won the tie on "john"
    assert_eq!(merged[0]["name"]["last"], "doe");
    assert_eq!(merged[2]["name"]["first"], "tina");

    // a shallower key makes every row2 name collide or not on its own
    let merged = rows::union(rows1, &rows2, &getter(["name", "last"]));
    assert_eq!(merged.as_array().expect("sequence result").len(), 4);
}

#[test]
fn deduplicate_first_seen_wins() {
    let deduped = rows::deduplicate(crew(), &getter(["name", "last"]), DedupMode::Whole);
    assert_eq!(
        deduped,
        json!({
            "posh": {"id": "a", "sex": "m", "name": {"first": "john", "last": "posh"}},
            "caine": {"id": "b", "sex": "f", "name": {"first": "liza", "last": "caine"}}
        })
    );
}

#[test]
fn deduplicate_whole_is_idempotent_on_its_own_output() {
    let once = rows::deduplicate(crew(), &getter(["name", "last"]), DedupMode::Whole);
    let twice = rows::deduplicate(once.clone(), &getter(["name", "last"]), DedupMode::Whole);
    assert_eq!(once, twice);
}

#[test]
fn deduplicate_marker_and_projection_modes() {
    let marked = rows::deduplicate(crew(), &getter("sex"), DedupMode::Marker);
    assert_eq!(marked, json!({"m": 1, "f": 1}));

    let translators = compile_translators(vec![TranslatorSpec::new("id")]);
    let projected = rows::deduplicate(crew(), &getter("sex"), DedupMode::Project(&translators));
    assert_eq!(projected, json!({"m": {"id": "a"}, "f": {"id": "b"}}));
}

#[test]
fn hash_index_last_seen_wins() {
    let indexed = rows::hash_index(crew(), &getter(["name", "last"]), None);
    let indexed = indexed.as_object().expect("mapping");
    assert_eq!(indexed.len(), 2);
    // unlike deduplicate, the later "posh" row replaced the earlier one
    assert_eq!(indexed["posh"]["id"], "c");
    assert_eq!(indexed["caine"]["id"], "b");
}

#[test]
fn hash_index_with_a_default_marks_instead_of_storing() {
    let indexed = rows::hash_index(crew(), &getter("sex"), Some(json!(true)));
    assert_eq!(indexed, json!({"m": true, "f": true}));
}

#[test]
fn translate_all_builds_a_fresh_row_per_element() {
    let translators = compile_translators(vec![
        TranslatorSpec::new(["name", "last"]).to("lastname"),
        TranslatorSpec::new("id"),
    ]);
    let out = rows::translate_all(&crew(), &translators);
    assert_eq!(
        out,
        json!([
            {"lastname": "posh", "id": "a"},
            {"lastname": "caine", "id": "b"},
            {"lastname": "posh", "id": "c"}
        ])
    );
}

#[test]
fn identity_translators_are_idempotent_on_their_own_output() {
    // getter keys equal to setter keys: a second application changes nothing
    let translators = compile_translators(vec![
        TranslatorSpec::new("id"),
        TranslatorSpec::new("sex"),
    ]);
    let once = rows::translate_all(&crew(), &translators);
    let twice = rows::translate_all(&once, &translators);
    assert_eq!(once, twice);
}

#[test]
fn rename_fields_keep_only_renamed() {
    let input = json!([{"a": 1, "b": 2}, {"b": 3}]);
    let out = rows::rename_fields(&input, &["a"], Some(&["x"]), true);
    // pairs absent from a row are skipped
    assert_eq!(out, json!([{"x": 1}, {}]));
}

#[test]
fn rename_fields_can_carry_the_rest_across() {
    let input = json!([{"a": 1, "b": 2, "c": 3}]);
    let out = rows::rename_fields(&input, &["a"], Some(&["x"]), false);
    assert_eq!(out, json!([{"b": 2, "c": 3, "x": 1}]));
}

#[test]
fn rename_fields_defaults_new_names_to_old() {
    let input = json!([{"a": 1, "b": 2}]);
    let out = rows::rename_fields(&input, &["a", "b"], None, true);
    assert_eq!(out, json!([{"a": 1, "b": 2}]));
}

#[test]
fn scalar_collections_fold_to_the_empty_mapping() {
    assert_eq!(rows::group_by(json!(42), &getter("k")), json!({}));
    assert_eq!(rows::tally(&json!("nope"), &getter("k")), json!({}));
    assert_eq!(rows::extract(&Value::Null, &[getter("k")]), json!({}));
}

#[test]
fn hashify_flattens_and_marks() {
    let hashed = rows::hashify(&json!(["a", ["b", ["c"]], "a"]), None);
    assert_eq!(hashed, json!({"a": 1, "b": 1, "c": 1}));
    let hashed = rows::hashify(&json!([1, 2]), Some(json!("seen")));
    assert_eq!(hashed, json!({"1": "seen", "2": "seen"}));
}

#[test]
fn arrayify_explodes_a_mapping_into_rows() {
    let mapping = json!({"posh": 2, "caine": 1});
    let out = rows::arrayify(&mapping, None, None);
    assert_eq!(
        out,
        json!([
            {"key": "posh", "value": 2},
            {"key": "caine", "value": 1}
        ])
    );
    let out = rows::arrayify(&mapping, Some("last"), Some("count"));
    assert_eq!(out[0], json!({"last": "posh", "count": 2}));
}
