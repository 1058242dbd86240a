//! Export and backup command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cadence_core::db::Database;
use cadence_core::{FullBackup, ImportStats};

/// Write CSV to a file, or stdout when no path is given
fn write_output(content: &str, output: Option<&Path>, what: &str, rows: usize) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✅ Exported {} {} to {}", rows, what, path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub fn cmd_export_subscriptions(db: &Database, output: Option<&Path>) -> Result<()> {
    let csv = db.export_subscriptions_csv()?;
    let (total, _) = db.count_subscriptions()?;
    write_output(&csv, output, "subscriptions", total as usize)
}

pub fn cmd_export_payments(db: &Database, output: Option<&Path>) -> Result<()> {
    let csv = db.export_payments_csv()?;
    let count = db.count_payments()?;
    write_output(&csv, output, "payments", count as usize)
}

pub fn cmd_export_backup(db: &Database, output: &Path) -> Result<FullBackup> {
    let backup = db.export_full_backup()?;
    let json = serde_json::to_string_pretty(&backup)?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✅ Backup written to {}", output.display());
    println!(
        "   {} subscriptions, {} payments",
        backup.subscriptions.len(),
        backup.payments.len()
    );

    Ok(backup)
}

pub fn cmd_import_backup(db: &Database, file: &Path, clear: bool) -> Result<ImportStats> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let backup: FullBackup = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid backup file", file.display()))?;

    println!(
        "📥 Importing backup v{} from {}...",
        backup.metadata.version, backup.metadata.created_at
    );
    if clear {
        println!("   ⚠️  Clearing existing data first");
    }

    let stats = db.import_full_backup(&backup, clear)?;

    println!("✅ Import complete");
    println!("   Subscriptions: {}", stats.subscriptions);
    println!("   Payments:      {}", stats.payments);
    if stats.skipped > 0 {
        println!("   Skipped:       {} (already present)", stats.skipped);
    }

    Ok(stats)
}
