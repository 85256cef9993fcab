use super::*;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

// Parsed through `FromStr` so the file, the environment and `--mode` all
// accept the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Mode {
    /// Start a download worker and cancel it explicitly
    Cancel,
    /// Start a download worker under a timeout
    Timeout,
    /// Bind a user id to the context and read it back downstream
    #[default]
    Value,
    /// All of the above, in order
    All,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cancel" => Ok(Mode::Cancel),
            "timeout" => Ok(Mode::Timeout),
            "value" => Ok(Mode::Value),
            "all" => Ok(Mode::All),
            _ => Err(format!(
                "Unknown mode '{s}', expected one of cancel, timeout, value, all"
            )),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // Logging level
    pub log_level: String,

    // Which demonstration to run
    pub mode: Mode,

    // Pause between download steps
    #[serde(deserialize_with = "human_duration")]
    pub interval: time::Duration,

    // How long the 'cancel' demonstration runs before cancelling
    #[serde(deserialize_with = "human_duration")]
    pub cancel_after: time::Duration,

    // Deadline for the 'timeout' demonstration
    #[serde(deserialize_with = "human_duration")]
    pub timeout: time::Duration,

    // The value bound by the 'value' demonstration
    pub user_id: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            mode: Mode::default(),
            interval: time::Duration::SECOND,
            cancel_after: time::Duration::seconds(3),
            timeout: time::Duration::seconds(10),
            user_id: 1225,
        }
    }
}

fn human_duration<'de, D>(deserializer: D) -> Result<time::Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    let d = humantime::parse_duration(&s).map_err(D::Error::custom)?;
    time::Duration::try_from(d).map_err(D::Error::custom)
}

fn options() -> getopts::Options {
    let mut opts = getopts::Options::new();
    opts.optflag("h", "help", "print this help menu")
        .optflag("v", "version", "print the version information")
        .optopt("c", "config", "use a custom configuration file", "FILE")
        .optopt(
            "m",
            "mode",
            "the demonstration to run: cancel, timeout, value or all",
            "MODE",
        );
    opts
}

pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("rs", "Strand", env!("CARGO_PKG_NAME")).map_or_else(
        || {
            cfg_if::cfg_if! {
                if #[cfg(all(
                    target_os = "linux",
                    not(feature = "packaged-installation")
                ))] {
                    Path::new("/etc/opt").join(env!("CARGO_PKG_NAME"))
                } else if #[cfg(unix)] {
                    Path::new("/etc").join(env!("CARGO_PKG_NAME"))
                } else {
                    Path::new(".").join(env!("CARGO_PKG_NAME"))
                }
            }
        },
        |proj_dirs| {
            proj_dirs.config_local_dir().to_path_buf()
            // Lin: /home/alice/.config/strand-demo
            // Mac: /Users/Alice/Library/Application Support/rs.Strand.strand-demo
        },
    )
}

/// Layers the configuration file (if any) and `STRAND_DEMO_*` environment
/// variables over the defaults.
///
/// Returns the configuration and a description of where it came from.
pub fn load(config_file: Option<String>) -> Result<(Config, String), ::config::ConfigError> {
    let mut b = ::config::Config::builder();

    // Add config file
    let config_source: String;
    if let Some(source) = config_file {
        config_source = format!("Using configuration file '{source}' specified on command line");
        b = b.add_source(::config::File::with_name(&source).format(::config::FileFormat::Toml))
    } else if let Ok(source) = std::env::var("STRAND_DEMO_CONFIG_FILE") {
        config_source = format!(
            "Using configuration file '{source}' specified by STRAND_DEMO_CONFIG_FILE environment variable"
        );
        b = b.add_source(::config::File::with_name(&source).format(::config::FileFormat::Toml))
    } else {
        let path = config_dir().join(format!("{}.toml", env!("CARGO_PKG_NAME")));
        config_source = format!("Using optional configuration file '{}'", path.display());
        b = b.add_source(
            ::config::File::from(path)
                .required(false)
                .format(::config::FileFormat::Toml),
        )
    }

    // Pull in environment vars
    b = b.add_source(::config::Environment::with_prefix("STRAND_DEMO").try_parsing(true));

    let config = b.build()?.try_deserialize()?;
    Ok((config, config_source))
}

fn init_logger(log_level: &str) {
    let log_level = log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .expect("Invalid 'log_level' value in configuration");

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(
            log_level > tracing_subscriber::filter::LevelFilter::from_level(tracing::Level::INFO),
        )
        .init();
}

pub fn init() -> Option<Config> {
    // Parse cmdline
    let opts = options();
    let args: Vec<String> = std::env::args().collect();
    let program = args[0].clone();
    let flags = opts
        .parse(&args[1..])
        .expect("Failed to parse command line args");
    if flags.opt_present("h") {
        let brief = format!(
            "{} {} - {}\n\nUsage: {} [options]",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION"),
            program
        );
        print!("{}", opts.usage(&brief));
        return None;
    }
    if flags.opt_present("v") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return None;
    }

    let (mut config, config_source) =
        load(flags.opt_str("config")).expect("Failed to read configuration");

    if let Some(mode) = flags.opt_str("mode") {
        config.mode = mode.parse().expect("Invalid --mode");
    }

    init_logger(&config.log_level);

    info!(
        "{} version {} starting...",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("{config_source}");
    debug!("{config:?}");

    Some(config)
}
