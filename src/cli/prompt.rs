//! Interactive prompts for settings missing from the command line.
//!
//! Questions go to standard error so that standard output only carries
//! results.

use std::io::{self, BufRead, Write};

use crate::cli::ConnectionArgs;
use crate::config::{normalize_base_url, ClientConfig, DEFAULT_BASE_URL};

pub const DEFAULT_USERNAME: &str = "Admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Source of answers to interactive questions.
pub trait Prompt {
    /// Ask a question and return the answer without the line ending.
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Ask for a secret; the answer is not echoed where supported.
    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        self.ask(question)
    }
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stderr = io::stderr();
        stderr.write_all(question.as_bytes())?;
        stderr.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        rpassword::prompt_password(question)
    }
}

/// Build the client configuration from flags, asking for what is missing.
///
/// Blank answers, and missing values when `interactive` is false, fall back
/// to `http://localhost:8080`, `Admin` and `admin`.
pub fn resolve_connection(
    args: &ConnectionArgs,
    prompt: &mut dyn Prompt,
    interactive: bool,
) -> io::Result<ClientConfig> {
    let base_url = match &args.base_url {
        Some(url) if !url.is_empty() => url.clone(),
        _ if interactive => prompt.ask(&format!("Input the URL (blank for {DEFAULT_BASE_URL}): "))?,
        _ => String::new(),
    };
    let base_url = if base_url.trim().is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        normalize_base_url(&base_url)
    };

    let username = match &args.username {
        Some(name) if !name.is_empty() => name.clone(),
        _ if interactive => {
            prompt.ask(&format!("Input your username (blank for {DEFAULT_USERNAME}): "))?
        }
        _ => String::new(),
    };
    let username = non_blank_or(username, DEFAULT_USERNAME);

    let password = match &args.password {
        Some(password) if !password.is_empty() => password.clone(),
        _ if interactive => {
            prompt.ask_secret(&format!("Input your password (blank for {DEFAULT_PASSWORD}): "))?
        }
        _ => String::new(),
    };
    let password = non_blank_or(password, DEFAULT_PASSWORD);

    Ok(ClientConfig::new(&base_url, &username, &password).with_ssl_verify(!args.insecure))
}

/// Decide which study to export from.
///
/// A `--study` value is used as-is, except `None`, which means all studies.
/// Without one, the user is asked only if the server has studies. The
/// available studies are written to `out`. `Some("")` selects the default
/// study.
pub fn select_study(
    flag: Option<&str>,
    studies: &[String],
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> io::Result<Option<String>> {
    match flag {
        Some("None") => return Ok(None),
        Some(study) => return Ok(Some(study.to_string())),
        None => {}
    }
    if studies.is_empty() {
        return Ok(None);
    }

    let answer = prompt.ask("Are you exporting from a particular study (blank for no)? ")?;
    if !answer.trim_start().starts_with('y') {
        return Ok(None);
    }

    writeln!(out, "Available studies:")?;
    for study in studies {
        writeln!(out, "* {study}")?;
    }
    let study = prompt.ask("Input the study to export from (blank for default): ")?;
    Ok(Some(study.trim().to_string()))
}

/// Decide whose patients to export.
///
/// Without an `--owner` value, the user is asked only when there is a choice
/// to make: more than one user, or any group. Blank means all owners.
pub fn select_owner(
    flag: Option<&str>,
    users: &[String],
    groups: &[String],
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> io::Result<Option<String>> {
    if let Some(owner) = flag {
        return Ok(Some(owner.to_string()).filter(|o| !o.is_empty()));
    }
    if users.len() <= 1 && groups.is_empty() {
        return Ok(None);
    }

    if users.len() > 1 {
        writeln!(out, "Available users:")?;
        for user in users {
            writeln!(out, "* {user}")?;
        }
    }
    if !groups.is_empty() {
        writeln!(out, "Available work groups:")?;
        for group in groups {
            writeln!(out, "* Groups.{group}")?;
        }
    }
    let owner = prompt.ask("Input which user or group's patients to export (blank for all users): ")?;
    let owner = owner.trim();
    Ok((!owner.is_empty()).then(|| owner.to_string()))
}

fn non_blank_or(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}
