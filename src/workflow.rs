use crate::cli::LookupArgs;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use uprun::catalog::{CatalogManager, CatalogUpdate, PatternMatcher};
use uprun::config::Config;
use uprun::source::{MavenSource, StaticSource, VersionSource};
use uprun::{UpdateError, UpdateRunner};

/// Execute the check workflow (plan only)
pub async fn execute_check(project_path: &Path, config: &Config, args: &LookupArgs) -> Result<()> {
    let stable_only = config.stable_only && !args.include_unstable;
    let version_channel = if stable_only { "stable" } else { "all" };
    println!(
        "{}",
        format!(
            "Checking for available updates ({} versions)...",
            version_channel
        )
        .cyan()
        .bold()
    );

    let procedure = build_procedure(project_path, config, args)?;
    let mut runner = UpdateRunner::builder(procedure)
        .show_progress(config.show_progress)
        .build();

    println!("\n{}", "2. Checking for available updates...".yellow());
    let pending = runner.plan(true).await?.len();

    if pending > 0 {
        println!("\n{}", "To apply these updates, run:".dimmed());
        let command = if stable_only {
            "uprun update"
        } else {
            "uprun update --include-unstable"
        };
        println!("  {}", command.cyan());
    }

    Ok(())
}

/// Execute the update workflow: plan, confirm, run
pub async fn execute_update(
    project_path: &Path,
    config: &Config,
    args: &LookupArgs,
    assume_yes: bool,
    no_progress: bool,
) -> Result<()> {
    println!("{}", "Starting dependency update process...".cyan().bold());

    let procedure = build_procedure(project_path, config, args)?;
    let mut runner = UpdateRunner::builder(procedure)
        .show_progress(config.show_progress && !no_progress)
        .build();

    println!("\n{}", "2. Checking for available updates...".yellow());
    if runner.plan(true).await?.is_empty() {
        return Ok(());
    }

    if !assume_yes {
        println!();
        match runner.confirm() {
            Ok(()) => {}
            Err(UpdateError::Aborted) => {
                println!("\n{}", "Update cancelled by user.".yellow());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("\n{}", "3. Applying updates...".yellow());
    runner.run(true).await?;

    println!(
        "\n{}",
        "✨ Update process completed successfully!".green().bold()
    );
    Ok(())
}

fn build_procedure(project_path: &Path, config: &Config, args: &LookupArgs) -> Result<CatalogUpdate> {
    println!("\n{}", "1. Validating project structure...".yellow());
    let manager = CatalogManager::discover(project_path)?;
    println!("{}", "✓ Project structure is valid".green());

    let filter = args
        .filter
        .as_deref()
        .map(PatternMatcher::new)
        .transpose()?;

    Ok(CatalogUpdate::new(manager, version_source(config, args)?)
        .stable_only(config.stable_only && !args.include_unstable)
        .filter(filter))
}

fn version_source(config: &Config, args: &LookupArgs) -> Result<Arc<dyn VersionSource>> {
    if let Some(path) = &args.versions {
        println!(
            "   Using version listing {}",
            path.display().to_string().dimmed()
        );
        return Ok(Arc::new(StaticSource::load(path)?));
    }

    let source = MavenSource::with_repositories(config.repositories.clone())?
        .plugin_repository(config.plugin_repository.as_str())?;

    println!("   Found {} repositories:", source.repositories().len());
    for repo in source.repositories() {
        println!("   • {} ({})", repo.name.bright_cyan(), repo.url.dimmed());
    }

    Ok(Arc::new(source))
}
