//! Wynnbot - A Matrix bot for the Wynncraft MMORPG.
//!
//! # Overview
//!
//! Wynnbot answers commands in Matrix rooms with data from the Wynncraft
//! public API. Some answers are interactive messages driven by reactions:
//! a paged guild leaderboard, re-rollable item identifications and
//! confirmations.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! wynn:
//!   url: "https://api.wynncraft.com"
//!
//! matrix:
//!   user_id: "@wynnbot:matrix.org"
//!   password: "your-password"
//!   passphrase: "your-store-passphrase"
//!
//! interactive:
//!   timeout: 300
//!   sweep_interval: 5
//! ```
//!
//! Any value can be overridden with a `WYNNBOT_` prefixed environment variable,
//! for example `WYNNBOT_MATRIX__PASSWORD`.
//!
//! # Usage
//!
//! ```bash
//! wynnbot --config config.yaml --data ./wynnbot-data
//! ```
//!
//! # Bot Commands
//!
//! - `!wynn help` - Display help information
//! - `!wynn guilds` - Guild XP leaderboard, paged with reactions
//! - `!wynn id <item name> [-re]` - Simulate the identification of an item
//! - `!wynn close` - Close your interactive messages in the room
//!
//! # Architecture
//!
//! - [`bot`] - Main bot logic wiring Matrix, the commands and the registry
//! - [`commands`] - Command parsing and execution
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`interactive`] - Reaction-driven messages and their registry
//! - [`matrix`] - Matrix client integration and session management
//! - [`wynn`] - Wynncraft API client, items and identification rolls
//! - [`utils`] - Path handling and number display
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod commands;
mod config;
mod interactive;
mod matrix;
mod utils;
mod wynn;

/// Command-line arguments for the wynnbot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// See the [`config`] module for the expected format.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// This directory will contain:
    /// - `session` - Matrix session (access token and last sync token)
    /// - `sqlite` - Matrix SDK store, encrypted with the passphrase
    ///
    /// It holds the access token of the bot account and should only be
    /// readable by the bot.
    #[arg(short, long)]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting wynnbot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let bot = match Bot::new(config, &args.data).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {:?}", e);
            return;
        }
    };
    bot.start().await;
}
