//! CLI argument parsing types.
//!
//! This module provides the command-line interfaces of the `phenotips` and
//! `phenotips-export` binaries, and the interactive prompts that fill in
//! missing settings.

mod prompt;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub use prompt::{
    resolve_connection, select_owner, select_study, Prompt, TerminalPrompt, DEFAULT_PASSWORD,
    DEFAULT_USERNAME,
};

use crate::models::OBJECT_CLASS_PATIENT;

/// Server connection settings shared by both binaries.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    /// PhenoTips server URL (prompted if missing).
    #[arg(long, global = true, env = "PHENOTIPS_BASE_URL")]
    pub base_url: Option<String>,

    /// Account name (prompted if missing).
    #[arg(long, global = true, env = "PHENOTIPS_USERNAME")]
    pub username: Option<String>,

    /// Account password (prompted if missing).
    #[arg(long, global = true, env = "PHENOTIPS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept invalid TLS certificates.
    #[arg(long, global = true, default_value = "false")]
    pub insecure: bool,
}

/// Export PhenoTips patient records as CSV on standard output.
#[derive(Parser, Debug)]
#[command(name = "phenotips-export", about = "Export PhenoTips patient records as CSV", version)]
pub struct ExportCli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Only export patients of this study; `None` exports all studies.
    #[arg(long, env = "PHENOTIPS_STUDY")]
    pub study: Option<String>,

    /// Only export patients owned by this user or group (`Groups.<name>`).
    #[arg(long, env = "PHENOTIPS_OWNER")]
    pub owner: Option<String>,

    /// Never prompt; use defaults for anything not given.
    #[arg(short = 'y', long, default_value = "false")]
    pub yes: bool,
}

/// PhenoTips API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "phenotips", about = "PhenoTips API CLI", version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the primary properties of a patient.
    Get {
        /// Patient ID, e.g. P0000001.
        patient_id: String,
    },

    /// Resolve an external identifier to patient IDs.
    GetId {
        external_id: String,
    },

    /// List patients or other pages.
    List {
        /// What to list.
        entity: Entity,

        /// Study the patients belong to.
        #[arg(long)]
        study: Option<String>,

        /// User or group owning the patients.
        #[arg(long)]
        owner: Option<String>,

        /// Only patients carrying an object of this class.
        #[arg(long)]
        having_object: Option<String>,
    },

    /// Show the properties of a class.
    Schema {
        #[arg(default_value = OBJECT_CLASS_PATIENT)]
        class: String,
    },
}

/// Page kinds that can be listed.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    #[value(alias = "patient")]
    Patients,
    #[value(alias = "study")]
    Studies,
    #[value(alias = "user")]
    Users,
    #[value(alias = "group")]
    Groups,
}
