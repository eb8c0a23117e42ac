//! Command-line interface for the study buddy server

use clap::Parser;

/// AI Study Buddy - reflect on and improve your use of AI for learning
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "study-buddy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "STUDY_BUDDY_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Completion provider (openai, gemini)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model identifier passed to the completion provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
