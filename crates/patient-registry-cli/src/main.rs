//! `patient-registry` command-line front end.

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use patient_registry_core::diagram;
use patient_registry_core::{Database, PatientService, PatientView, RegistryConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = cli::build().get_matches();

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = RegistryConfig::load(config_path).context("loading configuration")?;
    if let Some(database) = matches.get_one::<PathBuf>("database") {
        config.database_path = database.clone();
    }

    match matches.subcommand() {
        Some(("diagram", args)) => generate_diagram(&config, args),
        Some((name, args)) => {
            let db = Database::open(&config.database_path).with_context(|| {
                format!("opening database {}", config.database_path.display())
            })?;
            run_patient_command(&db, name, args)
        }
        None => Ok(()),
    }
}

fn run_patient_command(db: &Database, name: &str, args: &ArgMatches) -> Result<()> {
    let service = PatientService::with_cpf_validator(db);
    // Only update/show/delete define an id
    let id = args
        .try_get_one::<String>("id")
        .ok()
        .flatten()
        .map(String::as_str)
        .unwrap_or_default();

    match name {
        "create" => {
            let patient = service.create(&cli::patient_input(args))?;
            print_view(&service.format_for_response(&patient))
        }
        "update" => {
            let patient = service.update(id, &cli::patient_input(args))?;
            print_view(&service.format_for_response(&patient))
        }
        "show" => {
            let patient = service.get(id)?;
            print_view(&service.format_for_response(&patient))
        }
        "list" => {
            let views: Vec<_> = service
                .list()?
                .iter()
                .map(|p| service.format_for_response(p))
                .collect();
            print_json(&views)
        }
        "search" => {
            let query = args
                .get_one::<String>("query")
                .map(String::as_str)
                .unwrap_or_default();
            let limit = args.get_one::<usize>("limit").copied().unwrap_or(20);
            let views: Vec<_> = service
                .search(query, limit)?
                .iter()
                .map(|p| service.format_for_response(p))
                .collect();
            print_json(&views)
        }
        "delete" => {
            service.delete(id)?;
            println!("Deleted {}", id);
            Ok(())
        }
        other => anyhow::bail!("unknown command: {}", other),
    }
}

fn generate_diagram(config: &RegistryConfig, args: &ArgMatches) -> Result<()> {
    println!("Generating UML class diagram...");

    let models = match args.get_one::<PathBuf>("models") {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Loading model definitions");
            diagram::load_descriptors(dir)?
        }
        None => diagram::domain_models(),
    };
    let output = args
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| config.diagram_output_dir.clone());

    let path = diagram::write_diagram(&models, &output)?;

    println!("UML diagram generated successfully!");
    println!("PlantUML file: {}", path.display());
    println!();
    println!("How to view the diagram:");
    println!("  - Online PlantUML: https://www.plantuml.com/plantuml/uml/");
    println!("  - VS Code PlantUML extension");
    println!("  - Edit source: {}", path.display());
    println!();

    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    println!("Found {} model(s): {}", models.len(), names.join(", "));
    Ok(())
}

fn print_view(view: &PatientView) -> Result<()> {
    println!("{}", view.to_json()?);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
