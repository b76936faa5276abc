//! wscat - Entry Point
//!
//! Interactive WebSocket client (`--connect`) and single-peer server
//! (`--listen`) for the terminal.

use clap::Parser;
use log::info;
use std::process;

use wscat::cli::Cli;
use wscat::config::Settings;
use wscat::console::Color;
use wscat::error::WscatError;
use wscat::error::handlers::{exit_code, handle_error};
use wscat::session;
use wscat::transport::tls;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Silent unless RUST_LOG is set; log lines would land on top of the prompt
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let cli = Cli::parse();

    // Mode is checked before anything touches the network
    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(e) => fail(e.into()),
    };

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => fail(e.into()),
    };

    tls::install_crypto_provider();
    info!("Starting wscat in {:?} mode", mode);

    // Exit explicitly: the blocking stdin reader would otherwise hold the runtime open
    match session::run(mode, cli.session_options(), settings).await {
        Ok(code) => process::exit(code),
        Err(e) => fail(e),
    }
}

fn fail(err: WscatError) -> ! {
    handle_error(&err);
    eprintln!(
        "{}error: {}{}",
        Color::Yellow.code(),
        err,
        Color::Default.code()
    );
    process::exit(exit_code(&err));
}
