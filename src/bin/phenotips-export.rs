//! PhenoTips CSV exporter.
//!
//! Writes one row per patient to standard output. Prompts, progress and the
//! final summary go to standard error.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use phenotips::cli::{resolve_connection, select_owner, select_study, ExportCli, TerminalPrompt};
use phenotips::{export_patients, format_elapsed, PatientFilter, PhenoTipsClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = ExportCli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: ExportCli) -> phenotips::Result<()> {
    let interactive = !cli.yes && io::stdin().is_terminal();
    let mut prompt = TerminalPrompt;

    let config = resolve_connection(&cli.connection, &mut prompt, interactive)?;
    let client = PhenoTipsClient::with_config(config)?;

    let mut filter = PatientFilter::default();
    if interactive {
        let mut stderr = io::stderr();
        let studies = match cli.study {
            Some(_) => Vec::new(),
            None => client.list_studies().await?,
        };
        filter.study = select_study(cli.study.as_deref(), &studies, &mut prompt, &mut stderr)?;

        let (users, groups) = match cli.owner {
            Some(_) => (Vec::new(), Vec::new()),
            None => (client.list_users().await?, client.list_groups().await?),
        };
        filter.owner =
            select_owner(cli.owner.as_deref(), &users, &groups, &mut prompt, &mut stderr)?;
    } else {
        filter.study = cli.study.filter(|study| study != "None");
        filter.owner = cli.owner.filter(|owner| !owner.is_empty());
    }

    let patient_ids = client.list(&filter).await?;
    eprint!("Exporting {} patient records...\n\n", patient_ids.len());

    let stdout = io::stdout();
    let summary = export_patients(&client, &patient_ids, stdout.lock(), |count| {
        eprint!("{count}\r")
    })
    .await?;

    eprintln!("Exported {} patients.", summary.exported);
    eprintln!("Elapsed time {}", format_elapsed(summary.elapsed));
    Ok(())
}
