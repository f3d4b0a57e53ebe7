//! sume - CLI entry point

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use cli::{Cli, Commands, ConfigCommands};
use commands::{exit_status, read_input, Session};
use sume::{Config, SourceDescriptor, SourceKind};

fn main() -> ExitCode {
    let cli = Cli::parse();
    sume::logging::init(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = commands::config::resolve_path(cli.config.as_deref())?;

    // Commands that never touch the pipeline.
    match &cli.command {
        Commands::Languages => {
            commands::languages::handle()?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Completions { shell } => {
            commands::completions::handle::<Cli>(*shell)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config(ConfigCommands::Path) => {
            commands::config::handle_path(&config_path)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config(ConfigCommands::Init { force }) => {
            commands::config::handle_init(&config_path, *force)?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let config = Config::load_from(&config_path)?;
    match &cli.command {
        Commands::Config(ConfigCommands::Show) => {
            commands::config::handle_show(&config)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Doctor => return Ok(exit_status(commands::doctor::handle(&config)?)),
        _ => {}
    }

    let session = Session::start(&config)?;
    let summarizer = &session.summarizer;

    let ok = match cli.command {
        Commands::Text { input, stages } => {
            let text = read_input(&input)?;
            let request = stages.request(SourceDescriptor::new(SourceKind::Text, text));
            commands::summarize::handle(summarizer, &request, stages.stats)?
        }
        Commands::File { path, stages } => {
            let request = stages.request(SourceDescriptor::Document(path));
            commands::summarize::handle(summarizer, &request, stages.stats)?
        }
        Commands::Web { url, stages } => {
            let request = stages.request(SourceDescriptor::Webpage(url));
            commands::summarize::handle(summarizer, &request, stages.stats)?
        }
        Commands::MediaUrl { url, stages } => {
            let request = stages.request(SourceDescriptor::MediaUrl(url));
            commands::summarize::handle(summarizer, &request, stages.stats)?
        }
        Commands::MediaFile { path, stages } => {
            let request = stages.request(SourceDescriptor::MediaFile(path));
            commands::summarize::handle(summarizer, &request, stages.stats)?
        }
        Commands::Extend { summary, focus } => {
            let summary = read_input(&summary)?;
            commands::summarize::handle_extend(summarizer, &summary, focus.as_deref())?
        }
        Commands::Translate { text, to } => {
            let text = read_input(&text)?;
            commands::summarize::handle_translate(summarizer, &text, &to)?
        }
        Commands::Batch { file, stages } => {
            commands::batch::handle(summarizer, file.as_deref(), &stages)?
        }
        Commands::Languages
        | Commands::Doctor
        | Commands::Config(_)
        | Commands::Completions { .. } => true,
    };

    if session.was_interrupted() {
        eprintln!("Interrupted");
        return Ok(ExitCode::from(130));
    }
    Ok(exit_status(ok))
}
