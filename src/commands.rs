//! Command handlers for the CLI

use chrono::Utc;
use colored::*;
use falcon_migrate::config::Settings;
use falcon_migrate::error::{AppError, AppResult};
use falcon_migrate::migration::{MigrationArtifact, MigrationStore, MigrationSynthesizer};
use falcon_migrate::models::ModelConfig;
use falcon_migrate::simulation::{DryRunResult, DryRunner};
use falcon_migrate::snapshot::{ColumnDelta, DiffEngine, ModelStore};
use std::path::Path;
use tracing::info;
use validator::Validate;

/// Load a model file that alter migrations can be generated for
fn load_relational(path: &Path) -> AppResult<ModelConfig> {
    let model = ModelStore::load_file(path)?;
    model.ensure_relational()?;
    Ok(model)
}

pub fn diff(old_path: &Path, new_path: &Path, json: bool) -> AppResult<()> {
    let (old, new) = (load_relational(old_path)?, load_relational(new_path)?);
    let (old, new) = (old.table_schema(), new.table_schema());
    let diff = DiffEngine::diff(&old, &new);

    if json {
        let report = serde_json::json!({ "diff": diff, "summary": diff.summary() });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {} → {}", "Diff".cyan().bold(), old_path.display(), new_path.display());
    if let Some((from, to)) = diff.rename() {
        println!("  {} table {} → {}", "»".magenta(), from, to.bold());
    }
    for delta in diff.deltas() {
        match delta {
            ColumnDelta::Added { name, new } => println!("  {} {} ({})", "+".green(), name.green(), new.data_type),
            ColumnDelta::Removed { name, old } => println!("  {} {} ({})", "-".red(), name.red(), old.data_type),
            ColumnDelta::Changed { name, old, new } => {
                println!("  {} {} ({} → {})", "~".yellow(), name.yellow(), old.data_type, new.data_type)
            }
            ColumnDelta::Unchanged { name } => println!("  {} {}", "=".dimmed(), name.dimmed()),
        }
    }

    let summary = diff.summary();
    println!(
        "\n  {} added, {} removed, {} changed, {} unchanged",
        summary.columns_added, summary.columns_removed, summary.columns_changed, summary.columns_unchanged
    );
    Ok(())
}

pub fn plan(old_path: &Path, new_path: &Path, verify: bool) -> AppResult<()> {
    let (old, new) = (load_relational(old_path)?, load_relational(new_path)?);
    let (old, new) = (old.table_schema(), new.table_schema());

    let Some(artifact) = MigrationSynthesizer::synthesize(&old, &new, Utc::now())? else {
        println!("{}", "✓ No schema changes detected".green());
        return Ok(());
    };

    print_plan(&artifact);

    if verify {
        let result = DryRunner::verify(&old, &new, &artifact)?;
        print_dry_run(&result)?;
    }
    Ok(())
}

pub fn alter(old_path: &Path, new_path: &Path, settings: &Settings) -> AppResult<()> {
    let (old, new) = (load_relational(old_path)?, load_relational(new_path)?);
    let (old, new) = (old.table_schema(), new.table_schema());

    match MigrationSynthesizer::synthesize(&old, &new, Utc::now())? {
        Some(artifact) => {
            let path = MigrationStore::new(&settings.migrations_dir).persist(&artifact)?;
            println!("{} {}", "✓ Created".green().bold(), path.display());
        }
        None => println!("{}", "✓ No schema changes detected".green()),
    }
    Ok(())
}

pub fn edit(model_name: &str, from: &Path, settings: &Settings) -> AppResult<()> {
    let models = ModelStore::new(&settings.models_dir);
    let existing = models.load(model_name)?;
    existing.ensure_relational()?;

    let incoming = ModelStore::load_file(from)?;
    let merged = existing.merge_update(incoming);
    merged.validate()?;

    match MigrationSynthesizer::synthesize(&existing.table_schema(), &merged.table_schema(), Utc::now())? {
        Some(artifact) => {
            let path = MigrationStore::new(&settings.migrations_dir).persist(&artifact)?;
            println!("{} {}", "✓ Created".green().bold(), path.display());
        }
        None => println!("{}", "✓ No schema changes detected".green()),
    }

    let path = models.save(&merged)?;
    info!("Model {} updated", merged.name);
    println!("{} {}", "✓ Updated".green().bold(), path.display());
    Ok(())
}

pub fn create(model_name: &str, settings: &Settings) -> AppResult<()> {
    let model = ModelStore::new(&settings.models_dir).load(model_name)?;
    model.ensure_relational()?;

    let artifact = MigrationSynthesizer::create_table(&model, Utc::now())?;
    let result = DryRunner::verify_create(&model, &artifact)?;
    if let Some(error) = result.error {
        return Err(AppError::Simulation(error));
    }

    let path = MigrationStore::new(&settings.migrations_dir).persist(&artifact)?;
    println!("{} {}", "✓ Created".green().bold(), path.display());
    Ok(())
}

pub fn list(settings: &Settings) -> AppResult<()> {
    let entries = MigrationStore::new(&settings.migrations_dir).list()?;
    if entries.is_empty() {
        println!("No migrations in {}", settings.migrations_dir.display());
        return Ok(());
    }

    println!("{} ({})", "Migrations".cyan().bold(), entries.len());
    for entry in &entries {
        println!(
            "  {}  {}  {}",
            entry.timestamp.yellow(),
            entry.description,
            entry.checksum[..12].dimmed()
        );
    }
    Ok(())
}

pub fn models(settings: &Settings) -> AppResult<()> {
    let store = ModelStore::new(&settings.models_dir);
    let names = store.list()?;
    if names.is_empty() {
        println!("No models in {}", settings.models_dir.display());
        return Ok(());
    }

    println!("{} ({})", "Models".cyan().bold(), names.len());
    for name in &names {
        let model = store.load(name)?;
        println!(
            "  {}  {}  {} columns",
            name.bold(),
            model.table_schema().resolved_table_name().dimmed(),
            model.schema.len()
        );
    }
    Ok(())
}

fn print_plan(artifact: &MigrationArtifact) {
    println!("{} {}", "Migration".cyan().bold(), artifact.file_name());
    println!();

    println!("{} ({} operations)", "UP".green().bold(), artifact.up().len());
    for (i, op) in artifact.up().iter().enumerate() {
        let line = format!("{}. {}", i + 1, op.description());
        if op.is_destructive() {
            println!("  {}", line.red());
        } else {
            println!("  {}", line.cyan());
        }
    }
    println!();

    println!("{} ({} operations)", "DOWN".yellow().bold(), artifact.down().len());
    for (i, op) in artifact.down().iter().enumerate() {
        println!("  {}", format!("{}. {}", i + 1, op.description()).yellow());
    }
    println!();

    println!("{}", artifact.code());
}

fn print_dry_run(result: &DryRunResult) -> AppResult<()> {
    for warning in &result.warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }
    match &result.error {
        None => {
            println!(
                "{} ({} steps replayed)",
                "✓ Round trip verified".green(),
                result.execution_plan.len()
            );
            Ok(())
        }
        Some(error) => Err(AppError::Simulation(error.clone())),
    }
}
