use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use xdg::BaseDirectories;

use crate::config::Config;

/// Default config.toml content
pub const DEFAULT_CONFIG: &str = r#"# Backend base URL. CODDOC_API_URL and --api-url take precedence.
api_url = "http://localhost:8000"

# Provider id sent with every request unless another one is picked in the UI.
# CODDOC_LLM_PROVIDER and --provider take precedence.
default_provider = "gemini"

# Reviews per history page (1-100).
page_limit = 10

# syntect theme for code blocks.
theme = "base16-ocean.dark"

# Editor for the code buffer.
# Resolved in order: this value → $VISUAL → $EDITOR → vi
# Supports arguments: editor = "code --wait"
# editor = "vim"

# Whole-request timeout in seconds; unset waits as long as the backend takes.
# request_timeout_secs = 120
"#;

/// Run the init command
pub fn run_init(force: bool) -> Result<()> {
    let base_dirs =
        BaseDirectories::with_prefix("coddoc").context("Failed to get config directory")?;
    init_config_dir(&base_dirs.get_config_home(), force)?;

    println!();
    println!("Initialization complete!");
    Ok(())
}

fn init_config_dir(config_home: &Path, force: bool) -> Result<()> {
    if !config_home.exists() {
        println!(
            "Creating configuration directory: {}",
            config_home.display()
        );
        fs::create_dir_all(config_home).context("Failed to create config directory")?;
    }
    write_file_if_needed(&config_home.join("config.toml"), DEFAULT_CONFIG, force)
}

/// Write a file if it doesn't exist or force is true
fn write_file_if_needed(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!(
            "Skipping {} (already exists, use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    println!("Writing {}...", path.display());
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
