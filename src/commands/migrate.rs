//! Migrate command - manages the users, posts and likes_dislikes schema.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let before = db.pending_migrations().await?;
    tracing::info!(action = ?args.action, pending = before, "Running migration command");

    match args.action {
        MigrateAction::Up => {
            if before == 0 {
                tracing::info!("Schema already up to date");
                return Ok(());
            }
            db.run_migrations().await?;
            tracing::info!(applied = before, "Migrations applied");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Rolled back the latest migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for line in status_report(&status) {
                println!("{}", line);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping users, posts and reactions before re-running migrations");
            db.fresh_migrations().await?;
            tracing::info!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}

/// One line per migration, followed by an applied/total summary.
fn status_report(status: &[(String, bool)]) -> Vec<String> {
    let applied = status.iter().filter(|(_, applied)| *applied).count();

    let mut lines: Vec<String> = status
        .iter()
        .map(|(name, applied)| {
            format!("{}: {}", name, if *applied { "applied" } else { "pending" })
        })
        .collect();
    lines.push(format!("{} of {} migrations applied", applied, status.len()));
    lines
}
