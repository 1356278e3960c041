mod config;
mod display;
mod error;
mod export;
mod model;
mod notify;
mod parser;
mod schedule;
mod store;
mod web;

use chrono::{Datelike, Local};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use display::print_plan;
use export::write_assignments;
use model::YearMonth;
use store::RosterStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volunteer_roster=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    let args: Vec<String> = std::env::args().collect();

    // Web mode: volunteer-roster web [port]
    if args.len() > 1 && args[1] == "web" {
        if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }
        let store = RosterStore::load(&config.data_dir)?;

        tracing::info!(host = %config.host, port = config.port, "starting web server");
        web::start_server(
            config.host.clone(),
            config.port,
            web::AppState::new(store, config.admin_password.clone()),
        )
        .await?;
        return Ok(());
    }

    // CLI mode: volunteer-roster [plan] [YYYY-MM] [--dry-run]
    let rest: Vec<&str> = args
        .iter()
        .skip(1)
        .map(String::as_str)
        .filter(|a| *a != "plan")
        .collect();
    let dry_run = rest.contains(&"--dry-run");
    let month = match rest.iter().find(|a| !a.starts_with("--")) {
        Some(m) => m.parse::<YearMonth>()?,
        None => {
            let today = Local::now().date_naive();
            YearMonth::new(today.year(), today.month())?
        }
    };

    println!("Loading roster from {}...", config.data_dir.display());
    let mut store = RosterStore::load(&config.data_dir)?;
    let existing = store.assignments().to_vec();

    println!("\n\n=== Running Auto-Plan ===");
    let planned = if dry_run {
        store.preview_plan(month)
    } else {
        store.plan_month(month)?
    };

    print_plan(month, &planned, store.shifts(), store.volunteers(), &existing);

    if dry_run {
        println!("\nDry run: nothing was saved");
        return Ok(());
    }

    if !planned.is_empty() {
        let plan_path = config.data_dir.join(format!("plan_{}.csv", month));
        write_assignments(&plan_path, &planned)?;
        println!("\nNew assignments saved to:");
        println!("  - {}", plan_path.display());
    }

    Ok(())
}
