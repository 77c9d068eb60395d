use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use metric_probe::config::Config;
use metric_probe::mbean::{
    build_identifier, build_key_value_table, gc_collector_id, last_gc_duration,
    read_attribute_within, AttributeValue, InMemoryRegistry, JmxHttpRegistry, RegistryError,
    ResourceIdentifier, ResourceRegistry,
};
use metric_probe::{parse_json, search_json};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Locate metric values in JMX registries and JSON documents
#[derive(Parser, Debug)]
#[command(name = "metric-probe", version, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the first field with a given name in a JSON document
    Search {
        /// Field name to look for
        #[arg(short, long)]
        field: String,

        /// JSON file to search (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Read an attribute of a registry resource
    Read {
        /// Resource domain
        #[arg(short, long, default_value = "java.lang")]
        domain: String,

        /// Key property name (repeat, paired with --value)
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,

        /// Key property value (repeat, paired with --key)
        #[arg(short, long = "value", required = true)]
        values: Vec<String>,

        /// Attribute to read
        #[arg(short, long)]
        attribute: String,

        /// Item of a composite attribute to print
        #[arg(short, long)]
        field: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the duration of the last collection of a garbage collector
    Gc {
        /// Collector name, e.g. "G1 Young Generation"
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Store defaults in the config file
    Configure {
        /// Default endpoint base URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Default lookup timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(ClapArgs, Debug)]
struct SourceArgs {
    /// Base URL of the daemon serving /jmx
    #[arg(long, conflicts_with = "snapshot")]
    endpoint: Option<String>,

    /// Saved /jmx dump to read instead of a live endpoint
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Lookup timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = level.as_filter()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("metric-probe started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("metric-probe").join("metric-probe.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".metric-probe").join("metric-probe.log");
    }
    PathBuf::from("metric-probe.log")
}

/// Where attributes are read from
enum Source {
    Live(JmxHttpRegistry),
    Snapshot(InMemoryRegistry),
}

impl ResourceRegistry for Source {
    async fn try_read(
        &self,
        id: &ResourceIdentifier,
        attribute: &str,
    ) -> Result<Option<AttributeValue>, RegistryError> {
        match self {
            Source::Live(registry) => registry.try_read(id, attribute).await,
            Source::Snapshot(registry) => registry.try_read(id, attribute).await,
        }
    }
}

fn open_source(args: &SourceArgs, config: &Config) -> Result<(Source, Duration)> {
    let timeout = config.effective_timeout(args.timeout);

    if let Some(path) = &args.snapshot {
        let dump = read_json_file(path)?;
        let registry = InMemoryRegistry::from_jmx_json(&dump)
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        return Ok((Source::Snapshot(registry), timeout));
    }

    let endpoint = config.effective_endpoint(args.endpoint.as_deref());
    tracing::info!("Using endpoint: {}", endpoint);
    let registry =
        JmxHttpRegistry::new(&endpoint, timeout).context("Failed to create registry client")?;
    Ok((Source::Live(registry), timeout))
}

fn read_json_file(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_json(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_stdin() -> Result<serde_json::Value> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read stdin")?;
    parse_json(&content).context("Failed to parse stdin")
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load();

    match args.command {
        Command::Search { field, file } => {
            let tree = match file {
                Some(path) => read_json_file(&path)?,
                None => read_stdin()?,
            };

            match search_json(&tree, &field) {
                Some(found) => {
                    print_json(found)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("Field {:?} not found", field);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Read {
            domain,
            keys,
            values,
            attribute,
            field,
            source,
        } => {
            let properties = build_key_value_table(&keys, &values).with_context(|| {
                format!(
                    "Expected matching --key/--value pairs, got {} keys and {} values",
                    keys.len(),
                    values.len()
                )
            })?;
            let id = build_identifier(&domain, properties)?;
            let (registry, timeout) = open_source(&source, &config)?;

            let value = read_attribute_within(&registry, &id, &attribute, timeout).await;
            let value = match (&value, &field) {
                (Some(v), Some(item)) => v.field(item),
                (v, None) => v.as_ref(),
                (None, Some(_)) => None,
            };

            match value {
                Some(v) => {
                    print_json(&v.to_json())?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("{} is not available on {}", attribute, id);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Gc { name, source } => {
            let id = gc_collector_id(&name)?;
            let (registry, timeout) = open_source(&source, &config)?;

            let duration = tokio::time::timeout(timeout, last_gc_duration(&registry, &id))
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!("Reading last GC info of {} timed out", id);
                    None
                });

            match duration {
                Some(ms) => {
                    println!("{} ms", ms);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("No collection recorded for {}", name);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Configure { endpoint, timeout } => {
            let mut config = config;
            if let Some(endpoint) = endpoint {
                config.set_endpoint(&endpoint)?;
            }
            if let Some(secs) = timeout {
                config.set_timeout(secs)?;
            }
            print_json(&serde_json::to_value(&config)?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    run(args).await
}
