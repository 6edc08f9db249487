use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stringle::cli::parse_replacements;
use stringle::config::Config;
use stringle::core::{OutputFormat, OutputWriter};
use stringle::{Job, ReplaceOptions};

#[derive(Parser)]
#[command(name = "stringle")]
#[command(author, version)]
#[command(
    about = "Bulk find and replace in files",
    after_help = "Examples:
  stringle ./src 'old:new'
  stringle ./src 'foo:bar' 'old:new'
  stringle ./src 'hello:hi' -i -e .py -e .txt
  stringle ./src 'Test\\d+:Result' -r --dry-run
  stringle ./src 'old:new' --ignore-dir .git --ignore-dir build"
)]
struct Cli {
    /// Root directory to search in
    directory: PathBuf,

    /// Replacements in the form "search:replace" (escape a literal colon as \:)
    #[arg(required = true)]
    replacements: Vec<String>,

    /// Case-insensitive matching
    #[arg(short, long)]
    ignore_case: bool,

    /// Treat search patterns as regular expressions
    #[arg(short, long)]
    regex: bool,

    /// Only process files with this extension (repeatable)
    #[arg(short = 'e', long = "extension")]
    extensions: Vec<String>,

    /// Skip directories with this name (repeatable, added to the defaults)
    #[arg(long = "ignore-dir")]
    ignore_dirs: Vec<String>,

    /// Skip this file (repeatable)
    #[arg(long = "ignore-file")]
    ignore_files: Vec<PathBuf>,

    /// Skip files with this extension (repeatable)
    #[arg(long = "ignore-ext")]
    ignore_extensions: Vec<String>,

    /// Preview changes without applying them
    #[arg(long)]
    dry_run: bool,

    /// Show a diff of every change (implies --dry-run)
    #[arg(long)]
    diff: bool,

    /// Process files in parallel
    #[arg(long)]
    parallel: bool,

    /// List the files the filters exclude and exit
    #[arg(long)]
    list_excluded: bool,

    /// Do not read .stringle.toml or the global config file
    #[arg(long)]
    no_config: bool,

    /// Output format
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Exit with status 2 when any file could not be processed
    #[arg(long)]
    fail_on_error: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Show modified files and debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = OutputWriter::new(cli.format, cli.verbose);
    match run(&cli, &output) {
        Ok(code) => code,
        Err(e) => {
            let _ = output.write_error(&format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "stringle=debug" } else { "stringle=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, output: &OutputWriter) -> Result<ExitCode> {
    let dry_run = cli.dry_run || cli.diff;
    let replacements =
        parse_replacements(&cli.replacements).context("Failed to parse replacements")?;

    let mut options = ReplaceOptions {
        case_sensitive: !cli.ignore_case,
        use_regex: cli.regex,
        dry_run,
        parallel: cli.parallel,
        include_extensions: non_empty(&cli.extensions),
        ignore_extensions: non_empty(&cli.ignore_extensions),
        ignore_dirs: non_empty(&cli.ignore_dirs),
        ignore_files: non_empty(&cli.ignore_files),
    };

    if !cli.no_config && cli.directory.is_dir() {
        let config = Config::load(&cli.directory)?;
        options = options.merge_config(&config);

        let project_config = Config::project_config_path(&cli.directory);
        if project_config.is_file() {
            options
                .ignore_files
                .get_or_insert_with(Vec::new)
                .push(project_config);
        }
    }

    let job = Job::new(&cli.directory, replacements, &options)?;

    if cli.list_excluded {
        let excluded: Vec<PathBuf> = job.directory().other_files().collect();
        output.write_other_files(excluded.iter().map(PathBuf::as_path))?;
        return Ok(ExitCode::SUCCESS);
    }

    let show_progress =
        !cli.quiet && cli.format == OutputFormat::Text && std::io::stderr().is_terminal();
    let progress = if show_progress {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} files {msg}")
                .context("Invalid progress template")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    } else {
        ProgressBar::hidden()
    };

    let job = job.with_progress(progress.clone());
    let stats = job.execute();
    progress.finish_and_clear();
    info!("{}", stats.summary_line(dry_run));

    let previews = cli.diff.then(|| job.preview(&stats.modified_files));
    output.write_report(&stats, previews.as_deref(), dry_run)?;

    if cli.fail_on_error && stats.has_errors() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}
