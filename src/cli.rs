//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Taskboard - project/task management API behind Cognito authentication
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TASKBOARD_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "TASKBOARD_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "TASKBOARD_LOG_FORMAT")]
    pub log_format: Option<String>,
}
