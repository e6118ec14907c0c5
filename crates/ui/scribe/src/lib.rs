//! Terminal front end for the `forms` crate: a single user record form with
//! inline validation, driven by a ratatui event loop.

pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod errors;
pub mod logging;
pub mod tui;

use clap::Parser;
use color_eyre::Result;

use crate::{app::App, cli::Cli, config::Config};

#[tokio::main]
pub async fn run() -> Result<()> {
    errors::init()?;
    let _guard = logging::init()?;

    let args = Cli::parse();
    let config = Config::new()?.merge_cli(&args);

    let mut app = App::new(config)?;
    app.run().await?;
    Ok(())
}
