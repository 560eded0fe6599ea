use allergy_core::db::migrations::latest_version;
use allergy_core::db::open_db_in_memory;
use allergy_core::{
    AllergyInput, AllergyRepository, AllergyService, DangerLevel, RepoError,
    SqliteAllergyRepository,
};
use rusqlite::Connection;

fn peanuts() -> AllergyInput {
    AllergyInput::new("Peanuts", DangerLevel::LifeThreatening)
        .with_symptoms("Anaphylaxis")
        .with_ingredients("peanut oil, groundnuts")
        .with_source("doctor")
        .with_notes("Carry EpiPen")
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let input = peanuts();
    let id = repo.create_allergy(&input).unwrap();

    let loaded = repo.get_allergy(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.to_input(), input);
    assert!(loaded.created_date.is_some());
}

#[test]
fn create_stores_blank_optional_fields_as_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let mut input = AllergyInput::new("Soy", DangerLevel::Mild);
    input.symptoms = Some("   ".to_string());
    let id = repo.create_allergy(&input).unwrap();

    let loaded = repo.get_allergy(id).unwrap().unwrap();
    assert_eq!(loaded.symptoms, None);
    assert_eq!(loaded.source, None);
}

#[test]
fn get_missing_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    assert!(repo.get_allergy(42).unwrap().is_none());
}

#[test]
fn duplicate_name_is_rejected_case_insensitively_without_mutation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    repo.create_allergy(&AllergyInput::new("Milk", DangerLevel::Moderate))
        .unwrap();

    let exact = repo
        .create_allergy(&AllergyInput::new("Milk", DangerLevel::Severe))
        .unwrap_err();
    assert!(matches!(exact, RepoError::DuplicateName(ref name) if name == "Milk"));

    let folded = repo
        .create_allergy(&AllergyInput::new("mILK", DangerLevel::Severe))
        .unwrap_err();
    assert!(matches!(folded, RepoError::DuplicateName(_)));

    assert_eq!(repo.count_allergies().unwrap(), 1);
    let stored = repo.find_by_name("milk").unwrap().unwrap();
    assert_eq!(stored.danger_level, DangerLevel::Moderate);
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let create_err = repo
        .create_allergy(&AllergyInput::new("   ", DangerLevel::Mild))
        .unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let id = repo.create_allergy(&peanuts()).unwrap();
    let update_err = repo
        .update_allergy(id, &AllergyInput::new("", DangerLevel::Mild))
        .unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
    assert_eq!(repo.count_allergies().unwrap(), 1);
}

#[test]
fn update_replaces_all_mutable_fields_and_keeps_created_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let id = repo.create_allergy(&peanuts()).unwrap();
    let before = repo.get_allergy(id).unwrap().unwrap();

    let replacement = AllergyInput::new("Peanut", DangerLevel::Severe).with_notes("re-tested");
    repo.update_allergy(id, &replacement).unwrap();

    let after = repo.get_allergy(id).unwrap().unwrap();
    assert_eq!(after.to_input(), replacement);
    assert_eq!(after.symptoms, None);
    assert_eq!(after.ingredients, None);
    assert_eq!(after.source, None);
    assert_eq!(after.created_date, before.created_date);
}

#[test]
fn update_missing_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let err = repo.update_allergy(7, &peanuts()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(7)));
}

#[test]
fn update_onto_an_exact_existing_name_is_reported_as_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    repo.create_allergy(&AllergyInput::new("Milk", DangerLevel::Moderate))
        .unwrap();
    let eggs = repo
        .create_allergy(&AllergyInput::new("Eggs", DangerLevel::Moderate))
        .unwrap();

    let err = repo
        .update_allergy(eggs, &AllergyInput::new("Milk", DangerLevel::Mild))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(_)));
    assert_eq!(
        repo.get_allergy(eggs).unwrap().unwrap().allergen_name,
        "Eggs"
    );
}

#[test]
fn delete_removes_record_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    let id = repo.create_allergy(&peanuts()).unwrap();
    repo.delete_allergy(id).unwrap();
    assert!(repo.get_allergy(id).unwrap().is_none());

    repo.delete_allergy(id).unwrap();
    repo.delete_allergy(9_999).unwrap();
    assert_eq!(repo.count_allergies().unwrap(), 0);
}

#[test]
fn list_orders_by_danger_desc_then_name_and_filters_by_level() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    for (name, level) in [
        ("Wheat", DangerLevel::Moderate),
        ("Soy", DangerLevel::Mild),
        ("Tree Nuts", DangerLevel::LifeThreatening),
        ("Eggs", DangerLevel::Moderate),
        ("Peanuts", DangerLevel::LifeThreatening),
        ("Milk", DangerLevel::Moderate),
    ] {
        repo.create_allergy(&AllergyInput::new(name, level)).unwrap();
    }

    let names = |records: Vec<allergy_core::AllergyRecord>| {
        records
            .into_iter()
            .map(|record| record.allergen_name)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        names(repo.list_allergies(None).unwrap()),
        vec!["Peanuts", "Tree Nuts", "Eggs", "Milk", "Wheat", "Soy"]
    );
    assert_eq!(
        names(repo.list_allergies(Some(DangerLevel::Moderate)).unwrap()),
        vec!["Eggs", "Milk", "Wheat"]
    );
    assert!(repo
        .list_allergies(Some(DangerLevel::Severe))
        .unwrap()
        .is_empty());
}

#[test]
fn persisted_out_of_range_danger_level_reads_as_nearest_level() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    repo.create_allergy(&AllergyInput::new("Peanuts", DangerLevel::Mild))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO allergies (allergen_name, danger_level) VALUES ('milk', 7);
         INSERT INTO allergies (allergen_name, danger_level) VALUES ('Soy', 0);",
    )
    .unwrap();

    let listed = repo.list_allergies(None).unwrap();
    let levels = listed
        .iter()
        .map(|record| (record.allergen_name.as_str(), record.danger_level))
        .collect::<Vec<_>>();
    assert_eq!(
        levels,
        vec![
            ("milk", DangerLevel::LifeThreatening),
            ("Peanuts", DangerLevel::Mild),
            ("Soy", DangerLevel::Mild),
        ]
    );
    assert_eq!(repo.search_allergies("mil", None).unwrap().len(), 1);

    let err = repo
        .create_allergy(&AllergyInput::new("Milk", DangerLevel::Moderate))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(_)));

    let stored: i64 = conn
        .query_row(
            "SELECT danger_level FROM allergies WHERE allergen_name = 'milk';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, 7);
}

#[test]
fn persisted_out_of_range_row_can_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO allergies (allergen_name, danger_level) VALUES ('Legacy', 9);",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    assert_eq!(
        repo.get_allergy(id).unwrap().unwrap().danger_level,
        DangerLevel::LifeThreatening
    );
    repo.delete_allergy(id).unwrap();
    assert!(repo.get_allergy(id).unwrap().is_none());
    assert_eq!(repo.count_allergies().unwrap(), 0);
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();
    let service = AllergyService::new(repo);

    let id = service.create_allergy(&peanuts()).unwrap();
    assert_eq!(
        service.get_allergy(id).unwrap().unwrap().allergen_name,
        "Peanuts"
    );
    assert_eq!(service.list_allergies(None).unwrap().len(), 1);
    assert_eq!(service.count_allergies().unwrap(), 1);

    service.delete_allergy(id).unwrap();
    assert!(service.get_allergy(id).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteAllergyRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_allergies_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteAllergyRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("allergies"))
    ));
}

#[test]
fn repository_rejects_table_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE allergies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            allergen_name TEXT NOT NULL UNIQUE,
            danger_level INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteAllergyRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "allergies",
            column: "symptoms"
        })
    ));
}

#[test]
fn repository_degrades_when_source_column_is_absent() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE allergies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            allergen_name TEXT NOT NULL UNIQUE,
            danger_level INTEGER NOT NULL,
            symptoms TEXT,
            ingredients TEXT,
            notes TEXT,
            created_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let repo = SqliteAllergyRepository::try_new(&conn).unwrap();
    let id = repo.create_allergy(&peanuts()).unwrap();
    let loaded = repo.get_allergy(id).unwrap().unwrap();

    assert_eq!(loaded.source, None);
    assert_eq!(loaded.notes.as_deref(), Some("Carry EpiPen"));

    repo.update_allergy(id, &peanuts().with_notes("updated"))
        .unwrap();
    assert_eq!(
        repo.get_allergy(id).unwrap().unwrap().notes.as_deref(),
        Some("updated")
    );
}
