//! Registry integration tests through the FFI facade.

use patient_registry_core::{
    format_cpf, is_valid_cpf, open_registry, open_registry_in_memory, FfiPatientInput,
    PatientRegistryError,
};

fn joao() -> FfiPatientInput {
    FfiPatientInput {
        name: Some("João".to_string()),
        surname: Some("Silva".to_string()),
        birthdate: Some("1990-01-01".to_string()),
        cpf: Some("11144477735".to_string()),
        role: Some("Patient".to_string()),
        education: Some("Superior".to_string()),
        mother_name: Some("Maria Silva".to_string()),
        email: Some("joao@example.com".to_string()),
    }
}

#[test]
fn test_create_and_show() {
    let registry = open_registry_in_memory().unwrap();

    let created = registry.create_patient(joao()).unwrap();
    assert_eq!(created.display_name, "João Silva");
    assert_eq!(created.formatted_cpf, "111.444.777-35");
    assert_eq!(created.category, "adult");

    let shown = registry.show_patient(created.id.clone()).unwrap();
    assert_eq!(shown.id, created.id);
    assert_eq!(shown.email, "joao@example.com");

    let raw = registry.get_patient(created.id).unwrap();
    assert_eq!(raw.cpf, "11144477735");
    assert_eq!(raw.birthdate, "1990-01-01");
}

#[test]
fn test_invalid_cpf_reports_field() {
    let registry = open_registry_in_memory().unwrap();

    let mut input = joao();
    input.cpf = Some("11144477736".to_string());

    match registry.create_patient(input) {
        Err(PatientRegistryError::ValidationError { fields, .. }) => {
            assert!(fields.contains_key("cpf"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(registry.list_patients().unwrap().is_empty());
}

#[test]
fn test_duplicate_cpf_does_not_add_record() {
    let registry = open_registry_in_memory().unwrap();
    registry.create_patient(joao()).unwrap();

    let mut twin = joao();
    twin.email = Some("twin@example.com".to_string());

    match registry.create_patient(twin) {
        Err(PatientRegistryError::ValidationError { fields, .. }) => {
            assert!(fields.contains_key("cpf"));
            assert!(!fields.contains_key("email"));
        }
        other => panic!("expected duplicate cpf error, got {:?}", other),
    }
    assert_eq!(registry.list_patients().unwrap().len(), 1);
}

#[test]
fn test_update_and_delete() {
    let registry = open_registry_in_memory().unwrap();
    let created = registry.create_patient(joao()).unwrap();

    let update = FfiPatientInput {
        name: Some("Updated Name".to_string()),
        surname: Some("Updated Surname".to_string()),
        mother_name: Some("Updated Mother".to_string()),
        ..FfiPatientInput::default()
    };
    let updated = registry.update_patient(created.id.clone(), update).unwrap();
    assert_eq!(updated.display_name, "Updated Name Updated Surname");
    assert_eq!(updated.formatted_cpf, created.formatted_cpf);

    registry.delete_patient(created.id.clone()).unwrap();
    assert!(matches!(
        registry.show_patient(created.id.clone()),
        Err(PatientRegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.delete_patient(created.id),
        Err(PatientRegistryError::NotFound(_))
    ));
}

#[test]
fn test_update_missing_patient() {
    let registry = open_registry_in_memory().unwrap();
    let result = registry.update_patient("missing".to_string(), joao());
    assert!(matches!(result, Err(PatientRegistryError::NotFound(_))));
}

#[test]
fn test_list_newest_first() {
    let registry = open_registry_in_memory().unwrap();
    registry.create_patient(joao()).unwrap();

    let mut ana = joao();
    ana.name = Some("Ana".to_string());
    ana.cpf = Some("529.982.247-25".to_string());
    ana.email = Some("ana@example.com".to_string());
    registry.create_patient(ana).unwrap();

    let names: Vec<_> = registry
        .list_patients()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Ana", "João"]);

    let found = registry.search_patients("An".to_string(), 10).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_file_backed_registry_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db").display().to_string();

    let id = {
        let registry = open_registry(path.clone()).unwrap();
        registry.create_patient(joao()).unwrap().id
    };

    let reopened = open_registry(path).unwrap();
    assert_eq!(reopened.show_patient(id).unwrap().name, "João");
}

#[test]
fn test_generate_diagram() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry_in_memory().unwrap();

    let path = registry
        .generate_diagram(dir.path().join("uml").display().to_string())
        .unwrap();

    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("@startuml"));
    assert!(content.contains("class Patient {"));
    assert!(content.contains("  + email: string"));
}

#[test]
fn test_cpf_helpers() {
    assert!(is_valid_cpf("111.444.777-35".to_string()));
    assert!(!is_valid_cpf("11144477736".to_string()));
    assert_eq!(format_cpf("11144477735".to_string()), "111.444.777-35");
}
