use allergy_core::db::open_db_in_memory;
use allergy_core::{
    export_csv_file, export_csv_writer, import_csv_file, AllergyInput, AllergyRepository,
    DangerLevel, DuplicatePolicy, SqliteAllergyRepository,
};

const HEADER: &str = "id,allergen_name,danger_level,symptoms,ingredients,source,notes,created_date";

#[test]
fn export_writes_header_for_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let mut buffer = Vec::new();
    let rows = export_csv_writer(&repo, &mut buffer).unwrap();

    assert_eq!(rows, 0);
    assert_eq!(String::from_utf8(buffer).unwrap(), format!("{HEADER}\n"));
}

#[test]
fn export_writes_rows_in_list_order_with_fixed_columns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let soy = repo
        .create_allergy(&AllergyInput::new("Soy", DangerLevel::Mild))
        .unwrap();
    let peanuts = repo
        .create_allergy(
            &AllergyInput::new("Peanuts", DangerLevel::LifeThreatening)
                .with_ingredients("peanut oil, groundnuts")
                .with_source("doctor"),
        )
        .unwrap();
    conn.execute(
        "UPDATE allergies SET created_date = '2024-01-02 03:04:05';",
        [],
    )
    .unwrap();

    let mut buffer = Vec::new();
    let rows = export_csv_writer(&repo, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(rows, 2);
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines[1],
        format!(
            "{peanuts},Peanuts,4,,\"peanut oil, groundnuts\",doctor,,2024-01-02 03:04:05"
        )
    );
    assert_eq!(lines[2], format!("{soy},Soy,1,,,,,2024-01-02 03:04:05"));
}

#[test]
fn exported_file_can_be_reimported() {
    let source_conn = open_db_in_memory().unwrap();
    let source = SqliteAllergyRepository::try_new(&source_conn).unwrap();
    source
        .create_allergy(
            &AllergyInput::new("Fish", DangerLevel::Severe)
                .with_symptoms("hives")
                .with_notes("cod, tuna"),
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allergies_export.csv");
    assert_eq!(export_csv_file(&source, &path).unwrap(), 1);

    let target_conn = open_db_in_memory().unwrap();
    let target = SqliteAllergyRepository::try_new(&target_conn).unwrap();
    let summary = import_csv_file(&target, &path, DuplicatePolicy::Skip);

    assert_eq!(summary.imported, 1);
    assert!(summary.errors.is_empty());
    let fish = target.find_by_name("Fish").unwrap().unwrap();
    assert_eq!(fish.to_input(), source.find_by_name("Fish").unwrap().unwrap().to_input());
}
