use clap::Parser;
use libeureg_batch::{
    BatchAvailabilityChecker, CheckConfig, CheckError, ErrorSink, EuregConfig, EuregTransport,
    FileErrorSink, TracingErrorSink, MAX_KEYWORDS_PER_BATCH, MAX_KEYWORDS_PER_CHECK,
    MAX_PENDING_ATTEMPTS,
};
use serde::{Deserialize, Serialize};
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Deserialize, Serialize)]
struct Config {
    #[serde(default)]
    check: CheckSection,
    #[serde(default)]
    tlds: TldConfig,
    #[serde(default)]
    log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct CheckSection {
    max_keywords: usize,
    keywords_per_batch: usize,
    max_pending_attempts: u32,
    pending_delay_ms: u64,
    timeout_secs: u64,
    max_requests_per_second: u32,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            max_keywords: MAX_KEYWORDS_PER_CHECK,
            keywords_per_batch: MAX_KEYWORDS_PER_BATCH,
            max_pending_attempts: MAX_PENDING_ATTEMPTS,
            pending_delay_ms: 0,
            timeout_secs: 15,
            max_requests_per_second: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct TldConfig {
    /// TLDs checked when `--tlds` is not given; empty means all supported
    #[serde(default)]
    default: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct LogConfig {
    #[serde(default)]
    error_log: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eq").join("config.toml"))
}

fn load_config() -> Config {
    config_path()
        .and_then(|path| std::fs::read_to_string(&path).ok())
        .and_then(|content| parse_config(&content))
        .unwrap_or_default()
}

fn parse_config(content: &str) -> Option<Config> {
    match toml::from_str(content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring unreadable config file: {}", e);
            None
        }
    }
}

fn get_default_config_toml() -> String {
    r#"# EuReg Query (eq) Configuration

[check]
# Keywords kept per run; extra keywords are dropped
max_keywords = 70
# Keywords per registrar request (each keyword expands to one name per TLD)
keywords_per_batch = 70
# Re-queries for domains the registrar reports as pending
max_pending_attempts = 10
# Pause before each pending re-query, in milliseconds
pending_delay_ms = 0
timeout_secs = 15
# 0 disables pacing
max_requests_per_second = 2

[tlds]
# Supported: ro, eu, com, net, info, org. Empty checks all of them.
# default = ["ro", "com"]
default = []

[log]
# Append failed requests to this file
# error_log = "/var/log/eq/errors.log"
"#
    .to_string()
}

#[derive(Parser, Debug)]
#[command(name = "eq")]
#[command(about = "EuReg Query - bulk domain availability across .ro .eu .com .net .info .org", long_about = None)]
struct Args {
    /// Keyword ideas to check (up to 70), e.g. "science blog"
    keywords: Vec<String>,

    /// Read additional keywords from a file, one per line
    #[arg(long, short = 'f')]
    keywords_file: Option<PathBuf>,

    /// Comma-separated list of TLDs to check (e.g., ro,com)
    #[arg(long, value_delimiter = ',')]
    tlds: Option<Vec<String>>,

    /// Also print domains that are taken or still pending
    #[arg(long, short = 'a')]
    all: bool,

    /// Append failed requests to this log file
    #[arg(long)]
    error_log: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn read_keywords(args: &Args) -> io::Result<Vec<String>> {
    let mut keywords = args.keywords.clone();
    if let Some(path) = &args.keywords_file {
        let content = std::fs::read_to_string(path)?;
        keywords.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    Ok(keywords)
}

fn check_config(section: &CheckSection, timeout_override: Option<u64>) -> CheckConfig {
    CheckConfig {
        max_keywords: section.max_keywords,
        keywords_per_batch: section.keywords_per_batch,
        max_pending_attempts: section.max_pending_attempts,
        pending_delay: Duration::from_millis(section.pending_delay_ms),
        request_timeout: Duration::from_secs(timeout_override.unwrap_or(section.timeout_secs)),
    }
}

fn selected_tlds(args: &Args, config: &Config) -> Option<Vec<String>> {
    match &args.tlds {
        Some(tlds) => Some(tlds.clone()),
        None if !config.tlds.default.is_empty() => Some(config.tlds.default.clone()),
        None => None,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", get_default_config_toml());
        return Ok(());
    }

    if args.write_default_config {
        if let Some(path) = config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, get_default_config_toml())?;
            println!("Default config written to: {}", path.display());
        } else {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
        return Ok(());
    }

    init_tracing();
    let config = load_config();

    let keywords = read_keywords(&args)?;
    if keywords.is_empty() {
        eprintln!("Error: At least one keyword is required");
        std::process::exit(1);
    }

    let check = check_config(&config.check, args.timeout);
    let transport = EuregTransport::with_config(EuregConfig {
        timeout: check.request_timeout,
        max_requests_per_second: config.check.max_requests_per_second,
        ..EuregConfig::default()
    })?;
    let sink: Arc<dyn ErrorSink> = match args.error_log.clone().or(config.log.error_log.clone()) {
        Some(path) => Arc::new(FileErrorSink::new(path)),
        None => Arc::new(TracingErrorSink),
    };
    let checker = BatchAvailabilityChecker::new(Arc::new(transport), sink, check)?;
    let tlds = selected_tlds(&args, &config);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(checker.check(&keywords[..], tlds.as_deref(), !args.all));

    match result {
        Ok(records) => {
            let mut stdout = io::stdout().lock();
            for record in &records {
                writeln!(stdout, "{}", serde_json::to_string(record)?)?;
            }
            stdout.flush()?;
            Ok(())
        }
        Err(CheckError::Configuration(e)) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error checking domain names: {}", e);
            std::process::exit(1);
        }
    }
}
