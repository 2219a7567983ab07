use std::fs;

use serde_json::json;
use tempfile::TempDir;

use veform::form::{Behavior, EventKind, SelectOption};
use veform::signaling::OutgoingMessage;
use veform::{Field, FieldSpec, FieldType, FormBuilder, FormError};

const SURVEY_YAML: &str = r#"
fields:
  - name: name
    question: "What is your name?"
    type: text
    validation:
      pattern: name
      readback: true
  - name: plan
    question: "Which plan would you like?"
    type: select
    validation:
      selectOptions:
        - label: Basic
          value: basic
          readAloud: true
          behaviors: []
        - label: Pro
          value: pro
          readAloud: true
          behaviors:
            - type: moveTo
              moveToFieldName: seats
    eventConfig:
      invalidAnswer:
        - type: output
          output: "Please pick basic or pro."
  - name: seats
    question: "How many seats?"
    type: number
    validation:
      minValue: 1
      maxValue: 500
  - name: bye
    question: "Thanks, we'll be in touch."
    type: info
"#;

#[test]
fn test_load_yaml_form_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("survey.yaml");
    fs::write(&path, SURVEY_YAML).unwrap();

    let builder = FormBuilder::from_file(&path).unwrap();
    assert_eq!(builder.len(), 4);
    assert!(builder.dangling_move_targets().is_empty());

    let plan = builder.get_field("plan").unwrap();
    assert_eq!(plan.field_type(), FieldType::Select);
    assert_eq!(plan.behaviors(EventKind::InvalidAnswer).len(), 1);
    assert_eq!(plan.move_targets(), vec!["seats"]);
}

#[test]
fn test_form_handshake_payload() {
    let builder = FormBuilder::from_yaml(SURVEY_YAML).unwrap();
    let value = serde_json::to_value(OutgoingMessage::Form(builder.snapshot())).unwrap();

    assert_eq!(value["type"], "form");
    let fields = value["payload"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0]["type"], "text");
    assert_eq!(fields[0]["validation"], json!({"pattern": "name", "readback": true}));
    assert_eq!(fields[1]["validation"]["selectOptions"][1]["readAloud"], true);
    assert_eq!(
        fields[1]["eventConfig"]["invalidAnswer"][0],
        json!({"type": "output", "output": "Please pick basic or pro."})
    );
    assert_eq!(fields[2]["validation"]["maxValue"], 500.0);
    assert!(fields[3].get("validation").is_none());
}

#[test]
fn test_json_form_with_foreign_validation_key() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.json");
    fs::write(
        &path,
        r#"[{"name": "ok", "question": "Ok?", "type": "yesNo", "validation": {"minValue": 3}}]"#,
    )
    .unwrap();

    let err = FormBuilder::from_file(&path).unwrap_err();
    assert!(matches!(err, FormError::InvalidValidation { ref name, .. } if name == "ok"));
}

#[test]
fn test_dangling_targets_reported() {
    let mut builder = FormBuilder::new();
    builder.add_field(
        FieldSpec::of_type("a", "A?", FieldType::YesNo)
            .with_behavior(EventKind::ValidYesAnswer, Behavior::move_to("missing")),
    );
    builder.add_field(FieldSpec::of_type("b", "B?", FieldType::Select));
    if let Some(Field::Select(select)) = builder.get_field_mut("b") {
        select.add_select_option(
            SelectOption::new("Other", "other").with_behavior(Behavior::move_to("nowhere")),
        );
    }

    assert_eq!(
        builder.dangling_move_targets(),
        vec![
            ("a".to_string(), "missing".to_string()),
            ("b".to_string(), "nowhere".to_string()),
        ]
    );
}
