use anyhow::Context;
use clap::Parser;
use crewflow::config::CrewConfig;
use crewflow::events::LoggingEventSink;
use crewflow::llm::EchoLlm;
use crewflow::pipeline::Crew;
use crewflow_cli::cli::{Cli, Command, RunArgs, ServeArgs};
use crewflow_cli::dashboard::{self, DashboardState};
use crewflow_cli::logging::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Serve(args) => serve(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.apply(CrewConfig::from_env()?);
    config.validate()?;

    let mut crew = Crew::new(config).with_event_sink(Arc::new(LoggingEventSink::info()));
    if args.dry_run {
        crew = crew.with_llm(Arc::new(EchoLlm));
    }

    let result = crew.run(&args.topic).await?;

    if args.json {
        let dict = result.to_dict();
        println!("{}", serde_json::to_string_pretty(&dict)?);
    } else {
        println!("{}", result.result);
        eprintln!("Research notes: {}", result.research_notes.display());
        eprintln!("Draft:          {}", result.draft.display());
        eprintln!("Final:          {}", result.final_path.display());
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = CrewConfig::from_env()?;
    info!(provider = %config.provider, model = config.model(), "Starting dashboard");

    let mut state = DashboardState::new(config);
    if args.dry_run {
        state = state.with_llm(Arc::new(EchoLlm));
    }

    dashboard::serve(Arc::new(state), args.addr())
        .await
        .context("dashboard server failed")
}
