//! Configuration management for the GPGL decoder.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional TOML config file (explicit, project-local, or user-global)
//! - Merging: command line > config file > defaults

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::path::SvgOptions;

/// Bytes read from the input per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Raw GPGL listen address
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8082";

/// Project-local config file name
pub const PROJECT_CONFIG_FILE: &str = ".gpgl.toml";

/// Command-line arguments for the GPGL decoder
#[derive(Debug, Default, Parser)]
#[command(name = "gpgl-decode")]
#[command(about = "Decode GPGL plotter streams into SVG paths")]
#[command(version)]
pub struct Args {
    /// GPGL file to decode, or '-' for stdin
    #[arg(long, short, help = "GPGL input file ('-' for stdin)")]
    pub input: Option<PathBuf>,

    /// Serve raw GPGL over TCP instead of reading a file
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = DEFAULT_LISTEN,
        help = "Address to accept raw GPGL connections on [default: 127.0.0.1:8082]"
    )]
    pub listen: Option<String>,

    #[arg(long, short, value_enum, help = "Output format")]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Bytes read per chunk")]
    pub chunk_size: Option<usize>,

    /// Explicit config file; skips discovery
    #[arg(long, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Log level (trace, debug, info, warn, error) [default: info]")]
    pub log_level: Option<String>,
}

/// How decoded batches are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Standalone SVG document
    Svg,
    /// One SVG path `d` line per batch
    #[default]
    Path,
    /// One JSON array of primitives per batch
    Json,
}

/// Where GPGL text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Tcp(String),
}

/// Contents of a config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub listen: Option<String>,
    pub chunk_size: Option<usize>,
    pub format: Option<OutputFormat>,
    pub log_level: Option<String>,
    pub svg: Option<SvgOptions>,
}

impl ConfigFile {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid config file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file {}", path.display()))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub source: InputSource,
    pub format: OutputFormat,
    pub chunk_size: usize,
    pub svg: SvgOptions,
    pub log_level: String,
    /// Config file that was applied, if any
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments and discovered files
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let (path, file) = match args.config.clone() {
            Some(explicit) => {
                let file = ConfigFile::load(&explicit)?;
                (Some(explicit), Some(file))
            }
            None => match discover_config_file() {
                Some(found) => {
                    let file = ConfigFile::load(&found)?;
                    (Some(found), Some(file))
                }
                None => (None, None),
            },
        };

        let mut config = Self::from_parts(args, file.unwrap_or_default())?;
        config.config_file = path;
        Ok(config)
    }

    /// Merge arguments over an already-loaded config file
    pub fn from_parts(args: Args, file: ConfigFile) -> Result<Self> {
        let source = match (args.input, args.listen.or(file.listen)) {
            (Some(path), _) if path.as_os_str() == "-" => InputSource::Stdin,
            (Some(path), _) => InputSource::File(path),
            (None, Some(addr)) => InputSource::Tcp(addr),
            (None, None) => InputSource::Stdin,
        };

        let chunk_size = args
            .chunk_size
            .or(file.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }

        Ok(Config {
            source,
            format: args.format.or(file.format).unwrap_or_default(),
            chunk_size,
            svg: file.svg.unwrap_or_default(),
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            config_file: None,
        })
    }
}

/// Project-local file first, then the user config directory
fn discover_config_file() -> Option<PathBuf> {
    let project = PathBuf::from(PROJECT_CONFIG_FILE);
    if project.is_file() {
        return Some(project);
    }

    dirs::config_dir()
        .map(|dir| dir.join("gpgl-decoder").join("config.toml"))
        .filter(|path| path.is_file())
}
