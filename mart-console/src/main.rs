//! TrustMart storefront console
//!
//! Terminal front-end for the TrustMart gateway: browse the catalog, manage
//! a cart, place and track orders, and (for admins) manage products,
//! clients, and order statuses.

mod app;
mod config;
mod pages;
mod remote;
mod widgets;

use crate::app::App;
use crate::config::ConsoleConfig;
use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use mart_client::{ClientConfig, KeycloakProvider, QueryClient};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs render inside the TUI (F12), never on stdout
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tui_logger::tracing_subscriber_layer())
        .with(env_filter)
        .init();
    tui_logger::init_logger(log::LevelFilter::Info).ok();
    tui_logger::set_default_level(log::LevelFilter::Info);

    let config = ConsoleConfig::from_env();
    std::fs::create_dir_all(&config.data_dir)?;

    let provider = KeycloakProvider::new(
        &config.keycloak_url,
        &config.keycloak_realm,
        &config.keycloak_client_id,
    );
    let client_config =
        ClientConfig::new(&config.api_base_url).with_session_file(config.session_file());
    let auth = Arc::new(client_config.build_auth_session(Arc::new(provider)));
    auth.init().await;

    let api = client_config.build_api_client().with_auth(auth.clone());
    let queries = Arc::new(QueryClient::new());

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let (app, rx) = App::new(&config, api, auth, queries);
    let result = app.run(rx, terminal).await;

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}
