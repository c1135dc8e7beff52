//! Command line arguments.

use clap::{Args, Parser, Subcommand};
use crewflow::config::{CrewConfig, ModelProvider};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Port the dashboard listens on by default.
pub const DEFAULT_PORT: u16 = 8501;

/// Researcher, Writer and Reviewer agents turning a topic into an article.
#[derive(Debug, Parser)]
#[command(name = "crewflow", version, about)]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline once and print the final article.
    Run(RunArgs),
    /// Serve the web dashboard.
    Serve(ServeArgs),
}

/// Arguments of `crewflow run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Topic to research and write about.
    #[arg(short, long)]
    pub topic: String,

    /// Directory the artifacts are written to.
    #[arg(long, env = "CREWFLOW_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Model provider: openai or ollama.
    #[arg(long)]
    pub provider: Option<ModelProvider>,

    /// Model for the selected provider.
    #[arg(long)]
    pub model: Option<String>,

    /// Completion token budget per call.
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Use an offline echo model instead of a real provider.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result paths and final text as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Layers the flags over `config`. The provider is applied first so
    /// `--model` lands on the right provider.
    #[must_use]
    pub fn apply(&self, mut config: CrewConfig) -> CrewConfig {
        if let Some(provider) = self.provider {
            config = config.with_provider(provider);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        config
    }
}

/// Arguments of `crewflow serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Use an offline echo model instead of a real provider.
    #[arg(long)]
    pub dry_run: bool,
}

impl ServeArgs {
    /// The socket address to listen on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
