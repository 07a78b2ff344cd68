//! # xtask - development task runner for the proposal-blink workspace.
//!
//! Invoked via the `cargo xtask` alias configured in `.cargo/config.toml`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use toml::Value;

const SERVICE_DIR: &str = "proposal-blink";
const DEFAULT_OPENAPI_OUTPUT: &str = "docs/openapi.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Task runner for the proposal-blink workspace.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Writes the service's OpenAPI document to disk.
    ///
    /// The output path is read from `[package.metadata.proposal_blink] openapi_output`
    /// in the service manifest, relative to the service directory.
    Openapi,

    /// Runs `cargo clippy` across the workspace with `-D warnings`.
    Lint,

    /// Runs all unit and integration tests in the workspace.
    Test,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Openapi => openapi()?,
        Commands::Lint => lint()?,
        Commands::Test => test()?,
    }

    Ok(())
}

fn openapi() -> Result<()> {
    println!("▶️  Generating OpenAPI document...");

    let project_root = get_project_root()?;
    let service_dir = project_root.join(SERVICE_DIR);

    let output = Command::new("cargo")
        .current_dir(&service_dir)
        .args(["run", "--quiet", "--bin", "openapi-spec-generator"])
        .output()
        .context("Failed to run openapi-spec-generator")?;

    if !output.status.success() {
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("openapi-spec-generator failed.");
    }

    let output_path = openapi_output_path(&service_dir)
        .unwrap_or_else(|| service_dir.join(DEFAULT_OPENAPI_OUTPUT));
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&output_path, &output.stdout)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("✅ OpenAPI document written to {}", output_path.display());
    Ok(())
}

fn lint() -> Result<()> {
    println!("▶️  Running linter...");

    let project_root = get_project_root()?;

    let clippy_status = Command::new("cargo")
        .current_dir(&project_root)
        .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        .status()
        .context("Failed to run cargo clippy")?;

    if !clippy_status.success() {
        anyhow::bail!("Clippy found errors.");
    }

    println!("✅ All checks passed.");
    Ok(())
}

fn test() -> Result<()> {
    println!("▶️  Running all tests...");

    let project_root = get_project_root()?;

    let status = Command::new("cargo")
        .current_dir(&project_root)
        .args(["test", "--workspace"])
        .status()
        .context("Failed to run cargo test")?;

    if !status.success() {
        anyhow::bail!("Tests failed.");
    }

    println!("✅ All tests passed.");
    Ok(())
}

fn get_project_root() -> Result<PathBuf> {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .context("Failed to get project root")
        .map(|p| p.to_path_buf())
}

/// Reads `[package.metadata.proposal_blink] openapi_output` from the service manifest.
fn openapi_output_path(service_dir: &Path) -> Option<PathBuf> {
    let toml_content = fs::read_to_string(service_dir.join("Cargo.toml")).ok()?;
    let toml_value: Value = toml::from_str(&toml_content).ok()?;

    let output = toml_value
        .get("package")?
        .get("metadata")?
        .get("proposal_blink")?
        .get("openapi_output")?
        .as_str()?;

    Some(service_dir.join(output))
}
