//! CLI argument parsing tests.

use clap::Parser;
use phenotips::cli::{Cli, Command, Entity, ExportCli};

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["phenotips", "get", "P0000001"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { patient_id } => assert_eq!(patient_id, "P0000001"),
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_list_with_filters() {
    let cli = Cli::parse_from([
        "phenotips",
        "list",
        "patients",
        "--study",
        "Cohort1",
        "--owner",
        "Groups.Lab",
        "--json",
    ]);

    assert!(cli.json);
    match cli.command {
        Command::List {
            entity,
            study,
            owner,
            having_object,
        } => {
            assert_eq!(entity, Entity::Patients);
            assert_eq!(study.as_deref(), Some("Cohort1"));
            assert_eq!(owner.as_deref(), Some("Groups.Lab"));
            assert_eq!(having_object, None);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_cli_accepts_singular_entity() {
    let cli = Cli::parse_from(["phenotips", "list", "study"]);
    match cli.command {
        Command::List { entity, .. } => assert_eq!(entity, Entity::Studies),
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_cli_schema_defaults_to_patient_class() {
    let cli = Cli::parse_from(["phenotips", "schema"]);
    match cli.command {
        Command::Schema { class } => assert_eq!(class, "PhenoTips.PatientClass"),
        _ => panic!("Expected Schema command"),
    }
}

#[test]
fn test_connection_flags_are_global() {
    let cli = Cli::parse_from([
        "phenotips",
        "get-id",
        "FAM-1",
        "--base-url",
        "https://phenotips.example.org",
        "--username",
        "jdoe",
        "--insecure",
    ]);

    assert_eq!(
        cli.connection.base_url.as_deref(),
        Some("https://phenotips.example.org")
    );
    assert_eq!(cli.connection.username.as_deref(), Some("jdoe"));
    assert!(cli.connection.insecure);
    assert!(matches!(cli.command, Command::GetId { ref external_id } if external_id == "FAM-1"));
}

#[test]
fn test_export_cli_flags() {
    let cli = ExportCli::parse_from(["phenotips-export", "--study", "None", "-y"]);

    assert_eq!(cli.study.as_deref(), Some("None"));
    assert_eq!(cli.owner, None);
    assert!(cli.yes);
}

#[test]
fn test_unknown_entity_rejected() {
    let result = Cli::try_parse_from(["phenotips", "list", "projects"]);
    assert!(result.is_err());
}
