mod args;
mod chat;

use anyhow::Result;
use args::{Cli, Commands};
use chat::Mode;
use clap::Parser;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use pairlink::server::{ServerConfig, serve};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            bind,
            room_ttl,
            max_candidates,
        }) => {
            println!("{}", "📡 Starting pairlink exchange store...".green().bold());
            let config = ServerConfig {
                bind,
                room_ttl: Duration::from_secs(room_ttl),
                max_candidates_per_room: max_candidates,
                ..ServerConfig::default()
            };
            serve(config).await
        }
        Some(Commands::Create) => chat::run(Mode::Create, &cli.peer).await,
        Some(Commands::Join { room }) => chat::run(Mode::Join(room), &cli.peer).await,
        None => {
            let mode = prompt_mode()?;
            chat::run(mode, &cli.peer).await
        }
    }
}

fn prompt_mode() -> Result<Mode> {
    let theme = ColorfulTheme::default();
    let choice = Select::with_theme(&theme)
        .with_prompt("What would you like to do?")
        .items(&["Create a room", "Join a room"])
        .default(0)
        .interact()?;

    if choice == 0 {
        return Ok(Mode::Create);
    }

    let room: String = Input::with_theme(&theme)
        .with_prompt("Room ID")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Room ID cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    Ok(Mode::Join(room))
}
