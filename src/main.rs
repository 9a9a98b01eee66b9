//! CLI entry point for mailshred.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use mailshred::config::{Config, Justification, ScannerReset};
use mailshred::model::email::Email;
use mailshred::report;
use mailshred::tranche::directory::DirectoryTranche;
use mailshred::tranche::monolithic::MonolithicTranche;
use mailshred::tranche::portfolio::PortfolioTranche;

#[derive(Parser)]
#[command(
    name = "mailshred",
    version,
    about = "Extract individual email messages from PDF document tranches"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// The shape of the tranche being scanned.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// One multi-page PDF containing many messages
    Monolithic,
    /// A directory of single-message PDFs
    Directory,
    /// A portfolio PDF whose embedded documents must be unpacked first
    Portfolio,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a tranche and write the message list and reports
    Scan {
        /// Source PDF or directory of PDFs
        src: PathBuf,

        /// Output directory for reports and intermediates
        #[arg(short, long, default_value = "mailshred-out")]
        output: PathBuf,

        /// Tranche shape (default: inferred from the source path)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Base name for report files (default: source file stem)
        #[arg(long)]
        base_name: Option<String>,

        /// Header label justification: left | right
        #[arg(short, long)]
        justification: Option<Justification>,

        /// Messages need not start on a fresh page
        #[arg(long)]
        free_running: bool,

        /// OCR each unit before extraction (image-only tranches)
        #[arg(long)]
        ocr: bool,

        /// Scanner reset policy: per-page | per-message
        #[arg(long)]
        scanner_reset: Option<ScannerReset>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mailshred::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Scan {
            src,
            output,
            mode,
            base_name,
            justification,
            free_running,
            ocr,
            scanner_reset,
        } => cmd_scan(
            &src,
            &output,
            mode,
            base_name.as_deref(),
            justification,
            free_running,
            ocr,
            scanner_reset,
            config,
        ),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mailshred::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailshred.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_scan(
    src: &Path,
    output: &Path,
    mode: Option<Mode>,
    base_name: Option<&str>,
    justification: Option<Justification>,
    free_running: bool,
    ocr: bool,
    scanner_reset: Option<ScannerReset>,
    mut config: Config,
) -> anyhow::Result<()> {
    // CLI flags override the config file
    if let Some(j) = justification {
        config.scan.header_justification = j;
    }
    if free_running {
        config.scan.new_page_for_each_message = false;
    }
    if ocr {
        config.scan.perform_ocr = true;
    }
    if let Some(reset) = scanner_reset {
        config.scan.scanner_reset = Some(reset);
    }

    let mode = mode.unwrap_or_else(|| {
        if src.is_dir() {
            Mode::Directory
        } else {
            Mode::Monolithic
        }
    });

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} units")?
            .progress_chars("=> "),
    );
    let progress = |done: u64, total: u64| {
        pb.set_length(total.max(1));
        pb.set_position(done);
    };

    let emails: Vec<Email> = match mode {
        Mode::Monolithic => {
            MonolithicTranche::new(src, output, config.scan.clone(), config.tools.clone())?
                .read(Some(&progress), None)?
        }
        Mode::Directory => {
            DirectoryTranche::new(src, output, config.scan.clone(), config.tools.clone())?
                .read(Some(&progress), None)?
        }
        Mode::Portfolio => {
            PortfolioTranche::new(src, output, config.scan.clone(), config.tools.clone())?
                .read(Some(&progress), None)?
        }
    };
    pb.finish_and_clear();

    let base = base_name
        .map(str::to_string)
        .or_else(|| {
            src.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "tranche".to_string());
    report::generate(&emails, output, &base)?;

    println!(
        "{} message(s) extracted from {}",
        emails.len(),
        src.display()
    );
    println!(
        "  message list: {}",
        output.join(format!("{base}-emails.json")).display()
    );
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailshred", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
