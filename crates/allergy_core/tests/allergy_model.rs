use allergy_core::{AllergyInput, AllergyRecord, DangerLevel};

#[test]
fn input_builders_trim_and_drop_blank_text() {
    let input = AllergyInput::new("  Tree Nuts ", DangerLevel::LifeThreatening)
        .with_symptoms(" swelling ")
        .with_ingredients("")
        .with_source("label");

    assert_eq!(input.allergen_name, "Tree Nuts");
    assert_eq!(input.symptoms.as_deref(), Some("swelling"));
    assert_eq!(input.ingredients, None);
    assert_eq!(input.source.as_deref(), Some("label"));
    assert_eq!(input.notes, None);
}

#[test]
fn danger_level_labels_and_display() {
    assert_eq!(DangerLevel::Mild.label(), "MILD");
    assert_eq!(DangerLevel::LifeThreatening.label(), "LIFE-THREATENING");
    assert_eq!(DangerLevel::Moderate.to_string(), "2 - Moderate");
    assert!(DangerLevel::Severe > DangerLevel::Moderate);
}

#[test]
fn record_serializes_danger_level_as_integer() {
    let record = AllergyRecord {
        id: 3,
        allergen_name: "Sesame".to_string(),
        danger_level: DangerLevel::Severe,
        symptoms: None,
        ingredients: Some("tahini".to_string()),
        source: None,
        notes: None,
        created_date: Some("2024-05-01 12:00:00".to_string()),
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["danger_level"], 3);
    assert_eq!(json["ingredients"], "tahini");
    assert!(json["symptoms"].is_null());

    let decoded: AllergyRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn deserialize_rejects_unknown_danger_level() {
    let value = serde_json::json!({
        "allergen_name": "Kiwi",
        "danger_level": 5,
        "symptoms": null,
        "ingredients": null,
        "source": null,
        "notes": null
    });

    let err = serde_json::from_value::<AllergyInput>(value).unwrap_err();
    assert!(
        err.to_string()
            .contains("danger_level must be between 1 and 4, got 5"),
        "unexpected error: {err}"
    );
}
