//! Command-line definition.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches, Command};
use patient_registry_core::PatientInput;

/// Form fields shared by `create` and `update`: (flag, help).
const FIELD_ARGS: &[(&str, &str)] = &[
    ("name", "Given name"),
    ("surname", "Family name"),
    ("birthdate", "Date of birth (YYYY-MM-DD)"),
    ("cpf", "CPF, with or without punctuation"),
    ("role", "Occupation (empty to clear on update)"),
    ("education", "Education level (empty to clear on update)"),
    ("mother-name", "Mother's full name"),
    ("email", "Contact email"),
];

pub fn build() -> Command {
    Command::new("patient-registry")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Patient registry with CPF validation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database file (overrides config and PATIENT_REGISTRY_DB)"),
        )
        .subcommand(with_fields(
            Command::new("create").about("Register a new patient"),
        ))
        .subcommand(with_fields(
            Command::new("update")
                .about("Update fields of an existing patient")
                .arg(Arg::new("id").required(true).help("Patient ID")),
        ))
        .subcommand(
            Command::new("show")
                .about("Show one patient")
                .arg(Arg::new("id").required(true).help("Patient ID")),
        )
        .subcommand(Command::new("list").about("List patients, newest first"))
        .subcommand(
            Command::new("search")
                .about("Find patients by name or surname prefix")
                .arg(Arg::new("query").required(true))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .default_value("20")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Permanently delete a patient")
                .arg(Arg::new("id").required(true).help("Patient ID")),
        )
        .subcommand(
            Command::new("diagram")
                .about("Generate the PlantUML class diagram for domain models")
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory (default from config: storage/uml/)"),
                )
                .arg(
                    Arg::new("models")
                        .long("models")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory of JSON model definitions instead of the built-in ones"),
                ),
        )
}

fn with_fields(mut command: Command) -> Command {
    for (name, help) in FIELD_ARGS {
        command = command.arg(Arg::new(*name).long(*name).help(*help));
    }
    command
}

/// Collect form fields from a `create` or `update` invocation.
pub fn patient_input(args: &ArgMatches) -> PatientInput {
    let field = |name: &str| args.get_one::<String>(name).cloned();
    PatientInput {
        name: field("name"),
        surname: field("surname"),
        birthdate: field("birthdate"),
        cpf: field("cpf"),
        role: field("role"),
        education: field("education"),
        mother_name: field("mother-name"),
        email: field("email"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_consistent() {
        build().debug_assert();
    }

    #[test]
    fn test_create_fields() {
        let matches = build()
            .try_get_matches_from([
                "patient-registry",
                "create",
                "--name",
                "João",
                "--cpf",
                "111.444.777-35",
                "--mother-name",
                "Maria Silva",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let input = patient_input(args);

        assert_eq!(input.name.as_deref(), Some("João"));
        assert_eq!(input.cpf.as_deref(), Some("111.444.777-35"));
        assert_eq!(input.mother_name.as_deref(), Some("Maria Silva"));
        assert_eq!(input.email, None);
    }

    #[test]
    fn test_global_database_flag() {
        let matches = build()
            .try_get_matches_from(["patient-registry", "list", "--database", "/tmp/x.db"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("database"),
            Some(&PathBuf::from("/tmp/x.db"))
        );
    }
}
