//! Smart City Monitoring Core - Main Entry Point
//!
//! Headless runner for the reporting and export pipeline. The dashboard UI
//! is an external collaborator; this binary drives the same boundary
//! commands from the terminal.

mod api;
mod logic;
pub mod constants;

use logic::types::Module;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);
    log::info!("   Service: {}", logic::source::service().base_url());

    let args: Vec<String> = std::env::args().skip(1).collect();

    // One cooperative scheduler thread is enough: every network call
    // suspends instead of blocking.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    runtime.block_on(async {
        match args.first().map(String::as_str) {
            None | Some("watch") => run_watch().await,
            Some("dashboard") => run_dashboard().await,
            Some("report") => run_report(&args[1..]).await,
            Some("predict") => run_predict(&args[1..]).await,
            Some("export-csv") => run_export_csv(&args[1..]).await,
            Some("export-pdf") => run_export_pdf().await,
            Some(other) => {
                log::error!("Unknown command: {}", other);
                print_usage();
            }
        }

        flush_notifications();
    });
}

fn print_usage() {
    println!("Usage: smart-city-core [COMMAND]");
    println!();
    println!("Commands:");
    println!("  watch                     Run the dashboard with auto-refresh (default)");
    println!("  dashboard                 Fetch and print the dashboard overview once");
    println!("  report [MODULE] [TERM]    Fetch the report view, optionally filtered");
    println!("  predict MODULE JSON       Submit prediction parameters for one module");
    println!("  export-csv [MODULE]       Export prediction records as CSV");
    println!("  export-pdf                Download the service-rendered PDF report");
}

fn parse_module(name: &str) -> Option<Module> {
    let module = Module::from_name(name);
    if module.is_none() {
        log::error!("Unknown module: {} (expected traffic|energy|water|waste|air)", name);
    }
    module
}

async fn run_watch() {
    run_dashboard().await;

    if constants::is_auto_refresh_enabled() {
        if let Err(e) = logic::refresh::start(constants::get_refresh_interval()) {
            log::warn!("{}", e);
        }
    } else {
        log::info!("Auto-refresh disabled by configuration");
    }

    log::info!("Core service running. Press Ctrl+C to stop.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }

    if logic::refresh::is_running() {
        let _ = logic::refresh::stop();
    }

    // Session data lives only as long as the operator session.
    log::info!(
        "Stopping after {} refresh cycles, {} predictions submitted this session",
        logic::refresh::refresh_count(),
        logic::session::count()
    );
    logic::session::clear();
}

async fn run_dashboard() {
    match api::commands::get_dashboard().await {
        Ok(dashboard) => {
            println!("Total predictions: {}", dashboard.total_predictions);
            for (label, count) in dashboard.chart_labels.iter().zip(dashboard.chart_series.iter()) {
                println!("  {:<12} {}", label, count);
            }
            print_derived_metrics(&dashboard.stats);
        }
        Err(e) => log::warn!("Dashboard unavailable: {}", e),
    }
}

/// The per-module secondary counters the dashboard cards show.
fn print_derived_metrics(stats: &logic::types::StatsSnapshot) {
    for module in Module::ALL {
        let entry = stats.module(module);
        let (name, value) = match module {
            Module::Traffic => ("high congestion", entry.scalar("high_congestion")),
            Module::Energy => ("avg consumption kWh", entry.scalar("avg_consumption")),
            Module::Water => ("avg consumption L", entry.scalar("avg_consumption")),
            Module::Waste => ("collection needed", entry.scalar("collection_needed")),
            Module::Air => ("unhealthy days", entry.scalar("unhealthy_days")),
        };
        println!("  {:<12} {}: {}", module.label(), name, value);
    }
}

async fn run_report(args: &[String]) {
    let module = match args.first() {
        Some(name) => match parse_module(name) {
            Some(module) => Some(module),
            None => return,
        },
        None => None,
    };
    let search = args.get(1).cloned();

    match api::commands::get_report(module, search, None).await {
        Ok(report) => {
            println!(
                "{} records ({} after search filter), {} total predictions",
                report.records.len(),
                report.filtered.len(),
                report.total_predictions
            );
            for slice in &report.distribution {
                println!("  {:<12} {}", slice.label, slice.count);
            }
            for record in &report.filtered {
                println!(
                    "{} | {} | {}",
                    record.timestamp,
                    record.module.as_str(),
                    record.payload()
                );
            }
        }
        Err(e) => log::warn!("Report unavailable: {}", e),
    }
}

async fn run_predict(args: &[String]) {
    let module = match args.first().and_then(|name| parse_module(name)) {
        Some(module) => module,
        None => {
            print_usage();
            return;
        }
    };

    let params = match args.get(1) {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(params) => params,
            Err(e) => {
                log::error!("Invalid JSON parameters: {}", e);
                return;
            }
        },
        None => serde_json::json!({}),
    };

    match api::commands::submit_prediction(module, params).await {
        Ok(result) => {
            println!("{}", result);
            if let Ok(series) = api::commands::get_session_series(module) {
                for point in series {
                    println!("  {}: {}", point.label, point.value);
                }
            }
        }
        Err(e) => log::warn!("Prediction failed: {}", e),
    }
}

async fn run_export_csv(args: &[String]) {
    let module = match args.first() {
        Some(name) => match parse_module(name) {
            Some(module) => Some(module),
            None => return,
        },
        None => None,
    };

    if api::commands::is_export_in_progress() {
        log::info!("An export is already in progress");
        return;
    }

    match api::commands::export_records_csv(module).await {
        Ok(Some(path)) => println!("Saved {}", path),
        Ok(None) => log::info!("No artifact produced"),
        Err(e) => log::warn!("Export failed: {}", e),
    }
}

async fn run_export_pdf() {
    match api::commands::export_pdf_report().await {
        Ok(Some(path)) => println!("Saved {}", path),
        Ok(None) => log::info!("No artifact produced"),
        Err(e) => log::warn!("Export failed: {}", e),
    }
}

fn flush_notifications() {
    if logic::events::pending_count() == 0 {
        return;
    }
    for notice in api::commands::drain_notifications() {
        log::info!("[{:?}] {}", notice.kind, notice.message);
    }
}
