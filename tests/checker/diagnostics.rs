use coolc::diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticKind, SourceLocation};

#[test]
fn diagnostics_render_with_location_and_kind() {
    let d = Diagnostic::type_error(
        SourceLocation::new(3, 7),
        "Cannot convert \"Int\" into \"String\".",
    );
    insta::assert_snapshot!(
        d.to_string(),
        @r#"(3, 7) - TypeError: Cannot convert "Int" into "String"."#
    );
}

#[test]
fn diagnostics_serialize_for_tooling() {
    let d = Diagnostic::name_error(SourceLocation::new(1, 5), "Variable \"x\" is not defined in \"f\".");
    let value = serde_json::to_value(&d).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "kind": "NameError",
            "location": { "line": 1, "column": 5 },
            "message": "Variable \"x\" is not defined in \"f\"."
        })
    );
}

#[test]
fn collection_preserves_insertion_order_and_filters_by_kind() {
    let mut collection = DiagnosticCollection::new();
    collection.add(Diagnostic::semantic_error(
        SourceLocation::new(1, 1),
        "first",
    ));
    collection.add(Diagnostic::type_error(SourceLocation::new(2, 1), "second"));
    collection.add(Diagnostic::semantic_error(
        SourceLocation::new(3, 1),
        "third",
    ));

    let messages: Vec<&str> = collection.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert_eq!(collection.of_kind(DiagnosticKind::SemanticError).count(), 2);
    assert_eq!(collection.of_kind(DiagnosticKind::TypeError).count(), 1);
    assert!(collection.has_errors());
}
