mod args;
mod config;
mod dirs;

use std::io;
use std::time::Duration;

use usagebar_app::{AppConfig, AppState, RefreshOutcome};
use usagebar_cache::{DailyHistoryCache, MonthlyUsageCache, SourceStatus};
use usagebar_core::Provider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        println!("Created config at {}.", config.file.display());
    }

    let cache_dir = match config.config.cache_dir.clone() {
        Some(dir) => dir,
        None => {
            let resolution = dirs::resolve_cache_dir().map_err(io::Error::other)?;
            if resolution.matched_existing {
                println!("Using existing cache dir: {}", resolution.dir.display());
            }
            resolution.dir
        }
    };

    let mut app_config = AppConfig::with_default_roots(cache_dir);
    if let Some(root) = config.config.claude_root.clone() {
        app_config.claude_root = root;
    }
    if let Some(root) = config.config.codex_root.clone() {
        app_config.codex_root = root;
    }

    let state = AppState::new(app_config)
        .map_err(|err| io::Error::other(format!("failed to initialize cache store: {}", err)))?;

    match command {
        args::Command::Scan => run_scan(&state).await,
        args::Command::Show => {
            run_show(&state);
            Ok(())
        }
        args::Command::Watch { interval_secs } => run_watch(&state, interval_secs).await,
    }
}

async fn run_scan(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let (claude, codex, daily) = tokio::join!(
        state.services.claude_monthly.refresh(),
        state.services.codex_monthly.refresh(),
        state.services.daily.refresh(),
    );

    report_monthly(Provider::Claude, claude?);
    report_monthly(Provider::Codex, codex?);
    report_daily(daily?);

    Ok(())
}

fn report_monthly(provider: Provider, outcome: RefreshOutcome<MonthlyUsageCache>) {
    match outcome {
        RefreshOutcome::Debounced => {
            println!("{}: skipped (recently scanned)", provider);
        }
        RefreshOutcome::Completed { blob, stats } => {
            print_issues(&stats.issues);
            match blob.status {
                Some(SourceStatus::NoData) => {
                    println!("{}: no usage data found", provider);
                }
                Some(SourceStatus::ReadError) => {
                    println!("{}: logs could not be read", provider);
                }
                None => {
                    println!(
                        "{}: scanned {} files ({} skipped)",
                        provider, stats.files_scanned, stats.files_skipped
                    );
                    print_monthly(&blob);
                }
            }
        }
    }
}

fn report_daily(outcome: RefreshOutcome<DailyHistoryCache>) {
    match outcome {
        RefreshOutcome::Debounced => {
            println!("daily: skipped (recently scanned)");
        }
        RefreshOutcome::Completed { blob, stats } => {
            print_issues(&stats.issues);
            match blob.status {
                Some(SourceStatus::NoData) => println!("daily: no activity found"),
                Some(SourceStatus::ReadError) => println!("daily: logs could not be read"),
                None => {
                    println!("daily: {} days of history", blob.entries.len());
                }
            }
        }
    }
}

fn run_show(state: &AppState) {
    for provider in [Provider::Claude, Provider::Codex] {
        match state.store.load_monthly(provider) {
            Some(blob) => match blob.status {
                Some(SourceStatus::NoData) => {
                    println!("{}: no usage data (as of {})", provider, blob.fetched_at);
                }
                Some(SourceStatus::ReadError) => {
                    println!("{}: last scan failed (as of {})", provider, blob.fetched_at);
                }
                None => {
                    println!("{} (as of {})", provider, blob.fetched_at);
                    print_monthly(&blob);
                }
            },
            None => println!("{}: not scanned yet", provider),
        }
    }

    match state.store.load_daily_history() {
        Some(blob) if blob.status.is_none() => {
            println!("daily (as of {})", blob.fetched_at);
            for day in &blob.entries {
                println!(
                    "  {}  claude {:>10}  codex {:>10}",
                    day.date, day.claude_tokens, day.codex_tokens
                );
            }
        }
        Some(blob) => println!("daily: no history (as of {})", blob.fetched_at),
        None => println!("daily: not scanned yet"),
    }
}

async fn run_watch(state: &AppState, interval_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_secs(interval_secs);
    println!("Scanning every {}s. Press Ctrl+C to stop.", interval_secs);

    loop {
        run_scan(state).await?;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping.");
                return Ok(());
            }
        }
    }
}

fn print_monthly(blob: &MonthlyUsageCache) {
    for month in &blob.months {
        println!(
            "  {}  in {:>12}  out {:>12}  ${:.2}",
            month.month, month.input_tokens, month.output_tokens, month.total_cost_usd
        );
        for model in &month.models {
            println!(
                "    {:<30} in {:>12}  out {:>12}  ${:.2}",
                model.model, model.input_tokens, model.output_tokens, model.total_cost_usd
            );
        }
    }
}

fn print_issues(issues: &[ingest::ScanIssue]) {
    for issue in issues {
        eprintln!("warning: {}: {}", issue.file_path, issue.message);
    }
}
