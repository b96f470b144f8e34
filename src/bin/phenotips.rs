//! PhenoTips API CLI binary.
//!
//! A command-line interface for inspecting a PhenoTips server.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use phenotips::cli::{resolve_connection, Cli, Command, Entity, TerminalPrompt};
use phenotips::{PatientFilter, PhenoTipsClient, PrettyPrint};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match connect(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Pass --base-url/--username/--password or set PHENOTIPS_* variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn connect(cli: &Cli) -> phenotips::Result<PhenoTipsClient> {
    let interactive = io::stdin().is_terminal();
    let config = resolve_connection(&cli.connection, &mut TerminalPrompt, interactive)?;
    PhenoTipsClient::with_config(config)
}

async fn run(client: &PhenoTipsClient, cli: Cli) -> phenotips::Result<()> {
    match cli.command {
        Command::Get { patient_id } => {
            let patient = client.get(&patient_id).await?;
            output_single(&patient, cli.json)
        }
        Command::GetId { external_id } => match client.get_id(&external_id).await? {
            Some(found) => output_single(&found, cli.json),
            None => {
                eprintln!("No patient has external ID {external_id}");
                Err(phenotips::PhenoTipsError::ApiError {
                    status: 404,
                    message: format!("external ID {external_id} not found"),
                })
            }
        },
        Command::List {
            entity,
            study,
            owner,
            having_object,
        } => {
            let names = match entity {
                Entity::Patients => {
                    let filter = PatientFilter {
                        study,
                        owner,
                        having_object,
                    };
                    client.list(&filter).await?
                }
                Entity::Studies => client.list_studies().await?,
                Entity::Users => client.list_users().await?,
                Entity::Groups => client.list_groups().await?,
            };
            output_names(&names, cli.json)
        }
        Command::Schema { class } => {
            let schema = client.list_class_properties(&class).await?;
            output_single(&schema, cli.json)
        }
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> phenotips::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_names(names: &[String], json: bool) -> phenotips::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(names)?);
    } else {
        let rows: Vec<NameRow> = names.iter().map(|name| NameRow { name: name.clone() }).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", names.len());
    }
    Ok(())
}

// Table row type for non-JSON output

#[derive(Tabled)]
struct NameRow {
    name: String,
}
