//! Zest Well - community health services directory
//!
//! Lists clinics and support groups from the terminal. The clinic directory
//! is served from a local cache when the network is unavailable.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zestwell::cli::{
    origin_notice, render_group, render_record, search_term, Cli, Command, Dataset,
};
use zestwell::config::LoaderConfig;
use zestwell::data::{all_groups, groups_in_category, DirectoryRecord, SupportGroup};
use zestwell::directory::DirectoryLoader;
use zestwell::export::{to_csv, write_csv, Tabular, GROUP_COLUMNS, RECORD_COLUMNS};
use zestwell::network::{probe_target, OnlineStatus};
use zestwell::refresh::{RefreshConfig, RefreshHandle, RefreshMessage};

/// How often `watch` probes the directory endpoint for reachability
const PROBE_PERIOD: Duration = Duration::from_secs(15);

/// Installs the log subscriber. `RUST_LOG` overrides the default level.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zestwell=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the directory and reports when the data is not fresh
async fn load(loader: &DirectoryLoader) {
    let origin = loader.load_directory().await;
    if let Some(notice) = origin_notice(origin) {
        eprintln!("{}", notice);
    }
}

fn print_records(records: &[DirectoryRecord]) {
    if records.is_empty() {
        println!("No clinics found");
    }
    for record in records {
        println!("{}", render_record(record));
    }
}

fn print_groups(groups: &[&SupportGroup]) {
    if groups.is_empty() {
        println!("No support groups found");
    }
    for group in groups {
        println!("{}", render_group(group));
    }
}

fn export<R: Tabular>(
    rows: &[R],
    columns: &[&str],
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            write_csv(path, rows, columns)?;
            eprintln!("Exported {} rows to {}", rows.len(), path.display());
        }
        None => println!("{}", to_csv(rows, columns)?),
    }
    Ok(())
}

/// Reloads in the background until interrupted
async fn watch(
    loader: Arc<DirectoryLoader>,
    status: OnlineStatus,
    probe_addr: Option<String>,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let _monitor = probe_addr.map(|addr| status.spawn_monitor(addr, PROBE_PERIOD));

    load(&loader).await;
    println!("Loaded {} clinics", loader.working_set().len());

    let config = RefreshConfig {
        interval,
        ..Default::default()
    };
    let mut handle = RefreshHandle::spawn(Arc::clone(&loader), &status, config);

    loop {
        tokio::select! {
            message = handle.receiver.recv() => match message {
                Some(RefreshMessage::RefreshCompleted { origin }) => {
                    println!("Reloaded {} clinics", loader.working_set().len());
                    if let Some(notice) = origin_notice(origin) {
                        eprintln!("{}", notice);
                    }
                }
                Some(RefreshMessage::RefreshStarted) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.loader_config(LoaderConfig::from_env()?);
    let status = OnlineStatus::new(!cli.offline);
    let loader = Arc::new(config.build_loader(status.clone()));

    match cli.command {
        Command::List => {
            load(&loader).await;
            print_records(&loader.working_set());
        }
        Command::Show { id } => {
            load(&loader).await;
            let record = loader
                .find_by_id(id)
                .ok_or_else(|| format!("No clinic with ID {}", id))?;
            println!("{}", render_record(&record));
            println!(
                "    Location: {:.4}, {:.4}",
                record.coordinates.lat, record.coordinates.lng
            );
        }
        Command::Suburb { text } => {
            let term = search_term(&text)?;
            load(&loader).await;
            print_records(&loader.find_by_suburb(&term));
        }
        Command::Service { text } => {
            let term = search_term(&text)?;
            load(&loader).await;
            print_records(&loader.find_by_service(&term));
        }
        Command::Groups { category } => {
            let groups = match category {
                Some(category) => groups_in_category(&search_term(&category)?),
                None => all_groups().iter().collect(),
            };
            print_groups(&groups);
        }
        Command::Export {
            dataset: Dataset::Clinics,
            output,
        } => {
            load(&loader).await;
            export(&loader.working_set(), RECORD_COLUMNS, output.as_deref())?;
        }
        Command::Export {
            dataset: Dataset::Groups,
            output,
        } => {
            export(all_groups(), GROUP_COLUMNS, output.as_deref())?;
        }
        Command::ClearCache => {
            loader.clear_cache().await;
            println!("Clinic cache cleared");
        }
        Command::Watch { interval } => {
            let probe_addr = if cli.offline {
                None
            } else {
                config.source_url.as_deref().and_then(probe_target)
            };
            let interval = Duration::from_secs(interval.max(1));
            watch(loader, status, probe_addr, interval).await?;
        }
    }

    Ok(())
}
