//! Cadence CLI - Offline subscription tracker
//!
//! Usage:
//!   cadence init                               Initialize database
//!   cadence subscriptions add Netflix 15.99    Track a subscription
//!   cadence payments bill                      Record payments that came due
//!   cadence report analytics                   Totals, categories and trend
//!   cadence remind --daemon                    Keep reminding about due payments

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = Local::now().date_naive();
    let settings_path = cli.settings.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt, today),
        Commands::Subscriptions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_subscriptions_list(&db, &ListArgs::default()),
                Some(SubscriptionsAction::List(args)) => {
                    commands::cmd_subscriptions_list(&db, &args)
                }
                Some(SubscriptionsAction::Add(args)) => {
                    let settings = commands::load_settings(settings_path)?;
                    commands::cmd_subscriptions_add(
                        &db,
                        &args,
                        &settings.display.default_currency,
                        today,
                    )
                    .map(|_| ())
                }
                Some(SubscriptionsAction::Edit(args)) => {
                    commands::cmd_subscriptions_edit(&db, &args).map(|_| ())
                }
                Some(SubscriptionsAction::Show { name_or_id }) => {
                    commands::cmd_subscriptions_show(&db, &name_or_id)
                }
                Some(SubscriptionsAction::Pause { name_or_id }) => {
                    commands::cmd_subscriptions_set_active(&db, &name_or_id, false)
                }
                Some(SubscriptionsAction::Resume { name_or_id }) => {
                    commands::cmd_subscriptions_set_active(&db, &name_or_id, true)
                }
                Some(SubscriptionsAction::Delete { name_or_id }) => {
                    commands::cmd_subscriptions_delete(&db, &name_or_id)
                }
            }
        }
        Commands::Payments { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_payments_history(&db, None, 20),
                Some(PaymentsAction::History { name_or_id, limit }) => {
                    commands::cmd_payments_history(&db, name_or_id.as_deref(), limit)
                }
                Some(PaymentsAction::Record { name_or_id, date }) => {
                    commands::cmd_payments_record(&db, &name_or_id, date.as_deref(), today)
                        .map(|_| ())
                }
                Some(PaymentsAction::Bill) => commands::cmd_payments_bill(&db, today).map(|_| ()),
                Some(PaymentsAction::SeedDemo { months, seed }) => {
                    commands::cmd_payments_seed_demo(&db, months, seed, today).map(|_| ())
                }
                Some(PaymentsAction::Clear { yes }) => commands::cmd_payments_clear(&db, yes),
            }
        }
        Commands::Report { report } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match report {
                ReportType::Analytics { json } => commands::cmd_report_analytics(&db, today, json),
                ReportType::Spending { period, json } => {
                    let mut rng = rand::thread_rng();
                    commands::cmd_report_spending(&db, &period, today, json, &mut rng)
                }
                ReportType::Upcoming { days, json } => {
                    commands::cmd_report_upcoming(&db, days, today, json)
                }
            }
        }
        Commands::Remind { daemon } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            if daemon {
                commands::cmd_remind_daemon(db, cli.settings.clone()).await
            } else {
                let settings = commands::load_settings(settings_path)?;
                commands::cmd_remind(&db, &settings, today).map(|_| ())
            }
        }
        Commands::Settings { action } => match action {
            None | Some(SettingsAction::Show) => commands::cmd_settings_show(settings_path),
            Some(SettingsAction::Set { key, value }) => {
                commands::cmd_settings_set(settings_path, &key, &value).map(|_| ())
            }
            Some(SettingsAction::Path) => commands::cmd_settings_path(settings_path),
        },
        Commands::Export { export_type } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match export_type {
                ExportType::Subscriptions { output } => {
                    commands::cmd_export_subscriptions(&db, output.as_deref())
                }
                ExportType::Payments { output } => {
                    commands::cmd_export_payments(&db, output.as_deref())
                }
                ExportType::Backup { output } => {
                    commands::cmd_export_backup(&db, &output).map(|_| ())
                }
            }
        }
        Commands::ImportBackup { file, clear } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import_backup(&db, &file, clear).map(|_| ())
        }
    }
}
