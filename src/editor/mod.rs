use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::language::Language;

/// Check whether a command can be found in PATH and is executable.
fn command_found_in_path(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Generate editor candidates in priority order.
/// Resolution order (same as git): config → $VISUAL → $EDITOR → vi
fn editor_candidates(configured: Option<&str>) -> Vec<String> {
    [
        configured
            .filter(|s| !s.trim().is_empty())
            .map(String::from),
        env::var("VISUAL").ok().filter(|s| !s.trim().is_empty()),
        env::var("EDITOR").ok().filter(|s| !s.trim().is_empty()),
        Some("vi".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Resolve editor command and split into program + arguments.
///
/// Each candidate is checked for PATH availability. If none is found, the
/// first candidate is returned so execution produces a readable error.
/// Quoted arguments (e.g. `emacsclient -c -a ""`) are supported via
/// `shell_words::split`.
fn resolve_and_split_editor(configured: Option<&str>) -> Result<(String, Vec<String>)> {
    let candidates = editor_candidates(configured);
    let mut first_parsed: Option<(String, Vec<String>)> = None;
    let mut skipped: Vec<String> = Vec::new();

    for raw in &candidates {
        let parts = shell_words::split(raw)?;
        let Some(cmd) = parts.first() else { continue };
        let parsed = (cmd.clone(), parts[1..].to_vec());

        if first_parsed.is_none() {
            first_parsed = Some(parsed.clone());
        }

        if command_found_in_path(cmd) {
            if !skipped.is_empty() {
                tracing::warn!(
                    skipped_editors = ?skipped,
                    resolved_editor = %cmd,
                    "editor candidate not found in PATH, falling back"
                );
            }
            return Ok(parsed);
        }

        skipped.push(cmd.clone());
    }

    Ok(first_parsed.unwrap_or_else(|| ("vi".to_string(), vec![])))
}

/// Run a `Command`, converting `NotFound` into a user-friendly error message.
fn run_editor_command(cmd: &str, mut command: Command) -> Result<std::process::ExitStatus> {
    command.status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Editor '{}' not found (also checked $VISUAL and $EDITOR). \
                 Set 'editor' in ~/.config/coddoc/config.toml to an installed editor.",
                cmd
            )
        } else {
            anyhow::anyhow!("Failed to launch editor '{}': {}", cmd, e)
        }
    })
}

/// Edit the code buffer in an external editor.
///
/// The temp file carries the language's extension so the editor picks the
/// right mode. Returns `None` when the editor exits with a failure status,
/// leaving the buffer untouched.
/// The caller is responsible for suspending/restoring the TUI terminal.
pub fn open_code_editor(
    editor: Option<&str>,
    language: Language,
    initial: &str,
) -> Result<Option<String>> {
    let temp_file = tempfile::Builder::new()
        .prefix("coddoc-")
        .suffix(&format!(".{}", language.extension()))
        .tempfile()
        .context("Failed to create temp file for editor")?;

    fs::write(temp_file.path(), initial)?;

    let (cmd, args) = resolve_and_split_editor(editor)?;
    let mut command = Command::new(&cmd);
    command.args(&args).arg(temp_file.path());
    let status = run_editor_command(&cmd, command)?;

    if !status.success() {
        return Ok(None);
    }

    let content = fs::read_to_string(temp_file.path())?;
    Ok(Some(normalize_buffer(content)))
}

/// Read a source file for submission.
pub fn read_code_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(normalize_buffer(content))
}

/// CRLF to LF, and at most one trailing newline.
fn normalize_buffer(content: String) -> String {
    let content = if content.contains("\r\n") {
        content.replace("\r\n", "\n")
    } else {
        content
    };
    let trimmed = content.trim_end_matches('\n');
    if trimmed.len() == content.len() {
        content
    } else {
        format!("{}\n", trimmed)
    }
}
