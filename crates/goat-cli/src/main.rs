mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("GOAT_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return Ok(());
    }

    let mut ctx = match CliContext::load(cli.data_dir.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => output::output_error(&format!("Failed to load data: {}", e)),
    };

    match cli.command {
        Commands::Session(session_cmd) => {
            handlers::session::handle(&mut ctx, session_cmd.action).await?;
        }
        Commands::Drag(args) => {
            handlers::drag::handle(&mut ctx, args).await?;
        }
        Commands::Grid(grid_cmd) => {
            handlers::grid::handle(&mut ctx, grid_cmd.action).await?;
        }
        Commands::Backlog(backlog_cmd) => {
            handlers::backlog::handle(&mut ctx, backlog_cmd.action).await?;
        }
        Commands::Sync(sync_cmd) => {
            handlers::sync::handle(&mut ctx, sync_cmd.action).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
