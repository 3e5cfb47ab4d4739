//! CLI command definitions and execution
//!
//! Every action command turns its arguments into an `ActionRequest` and hands
//! it to the dispatcher; rendering of the uniform result is shared here.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;
use ydg_core::{
    ActionRequest, ConfigManager, Dispatcher, DispatcherConfig, NoProgress, OperationResult,
    ProgressSink, ResultData, TransferReport,
};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

mod completions;
mod delete;
mod download;
mod exec;
mod list;
mod rename;
mod upload;

/// ydg - Yandex Disk file gateway
///
/// Upload, download, rename, delete and list files on Yandex Disk.
/// Downloads resume from the bytes already on disk.
#[derive(Parser, Debug)]
#[command(name = "ydg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// OAuth token (overrides the config file)
    #[arg(long, global = true, env = "YDG_OAUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file or a web URL to the disk
    Upload(upload::UploadArgs),

    /// Download a file from the disk or a public link
    Download(download::DownloadArgs),

    /// Rename or move a file or folder on the disk
    Rename(rename::RenameArgs),

    /// Delete a file or folder on the disk
    Delete(delete::DeleteArgs),

    /// List a folder on the disk
    List(list::ListArgs),

    /// Run one action given as a JSON parameter object
    Exec(exec::ExecArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let flags = OutputConfig {
        // exec always answers with the structured result
        json: cli.json || matches!(cli.command, Commands::Exec(_)),
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    let request = match cli.command {
        Commands::Completions(args) => return completions::execute(args),
        Commands::Upload(args) => args.into_request(),
        Commands::Download(args) => args.into_request(),
        Commands::Rename(args) => args.into_request(),
        Commands::Delete(args) => args.into_request(),
        Commands::List(args) => args.into_request(),
        Commands::Exec(args) => match exec::read_request(&args) {
            Ok(request) => request,
            Err(e) => {
                Formatter::new(flags).error(&e.to_string());
                return ExitCode::from(&e);
            }
        },
    };

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => match ConfigManager::new() {
            Ok(manager) => manager,
            Err(e) => {
                Formatter::new(flags).error(&format!("Failed to locate configuration: {e}"));
                return ExitCode::from(&e);
            }
        },
    };
    let config = match manager.load() {
        Ok(config) => config,
        Err(e) => {
            Formatter::new(flags).error(&format!(
                "Failed to load {}: {e}",
                manager.config_path().display()
            ));
            return ExitCode::from(&e);
        }
    };

    debug!(path = %manager.config_path().display(), "configuration loaded");

    let output = flags.with_defaults(&config.defaults);
    let (client, transport) = match ydg_disk::connect(&config) {
        Ok(pair) => pair,
        Err(e) => {
            Formatter::new(output).error(&format!("Failed to create client: {e}"));
            return ExitCode::from(&e);
        }
    };

    let mut dispatcher_config = DispatcherConfig::from(&config);
    if let Some(token) = cli.token {
        debug!("using token from the command line");
        dispatcher_config.token = Some(token);
    }
    let dispatcher = Dispatcher::new(Arc::new(client), Arc::new(transport), dispatcher_config);

    run(&dispatcher, request, output).await
}

/// Dispatch one request, render its result and map it to an exit code
async fn run<A, T>(
    dispatcher: &Dispatcher<A, T>,
    mut request: ActionRequest,
    output: OutputConfig,
) -> ExitCode
where
    A: ydg_core::DiskApi,
    T: ydg_core::ByteTransport,
{
    request.show_progress |= output.shows_progress();
    let progress: Arc<dyn ProgressSink> = if request.show_progress {
        Arc::new(ProgressBar::new(&OutputConfig {
            json: false,
            ..output.clone()
        }))
    } else {
        Arc::new(NoProgress)
    };
    let formatter = Formatter::new(output);

    let result = tokio::select! {
        result = dispatcher.dispatch(&request, Arc::clone(&progress)) => result,
        _ = tokio::signal::ctrl_c() => {
            progress.finished();
            formatter.error("Interrupted; partially downloaded files are kept for --resume");
            return ExitCode::Interrupted;
        }
    };

    render(&result, &formatter);
    ExitCode::from(&result)
}

fn render(result: &OperationResult, formatter: &Formatter) {
    if !formatter.result(result) {
        return;
    }

    match &result.data {
        Some(ResultData::Transfer(report)) => print_transfer(report, formatter),
        Some(ResultData::Listing(page)) => list::print_page(page, formatter),
        Some(ResultData::Moved { from, to }) => {
            formatter.success(&format!("Renamed: {from} -> {to}"));
        }
        Some(ResultData::Deleted { path, permanently }) => {
            if *permanently {
                formatter.success(&format!("Deleted: {path}"));
            } else {
                formatter.success(&format!("Moved to trash: {path}"));
            }
        }
        None => {}
    }
}

fn print_transfer(report: &TransferReport, formatter: &Formatter) {
    let verb = match report.direction {
        ydg_core::Direction::Upload => "Uploaded",
        ydg_core::Direction::Download => "Downloaded",
    };

    if report.already_complete {
        formatter.success(&format!(
            "Already complete: {} ({})",
            report.destination,
            size(report.start_offset)
        ));
    } else {
        let mut line = format!(
            "{verb}: {} -> {} ({} in {} chunk(s)",
            report.source,
            report.destination,
            size(report.bytes_transferred),
            report.chunks
        );
        if report.resumed {
            line.push_str(&format!(", resumed at {}", size(report.start_offset)));
        }
        line.push(')');
        formatter.success(&line);
    }

    if let Some(url) = &report.public_url {
        formatter.println(&format!("Public URL: {url}"));
    }
}

fn size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Whether a command-line source names a web resource rather than a path
fn is_web_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
