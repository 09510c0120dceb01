use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use pitwall_lib::api::{ApiVersion, HttpCatalog};
use pitwall_lib::app::{Collaborators, UiState};
use pitwall_lib::config::AppConfig;
use pitwall_lib::player::SystemLauncher;
use pitwall_lib::secret::{CredentialStore, FileCredentialStore};
use pitwall_lib::state::Session;
use pitwall_lib::update::GithubReleases;
use pitwall_lib::VERSION;

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Read configuration from this file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remove the saved login and exit
    #[arg(long)]
    forget: bool,

    /// Check configuration and stored login, then exit
    #[arg(long)]
    check: bool,

    /// Write the effective configuration (defaults filled in) and exit
    #[arg(long)]
    save_config: bool,
}

fn collaborators(config: &AppConfig) -> Result<Collaborators, anyhow::Error> {
    Ok(Collaborators {
        v1: Arc::new(HttpCatalog::new(&config.catalog_url, ApiVersion::V1, VERSION)),
        v2: Arc::new(HttpCatalog::new(&config.catalog_url, ApiVersion::V2, VERSION)),
        store: Arc::new(FileCredentialStore::in_data_dir()?),
        updates: Arc::new(GithubReleases::new(&config.release_url, VERSION)),
        launcher: Arc::new(SystemLauncher::new()),
    })
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;
    let deps = collaborators(&config)?;

    // -- CLI MODE --
    if args.save_config {
        config.save(args.config.as_deref())?;
        println!("Configuration written.");
        return Ok(());
    }

    if args.forget {
        deps.store.remove()?;
        println!("Saved login removed.");
        return Ok(());
    }

    if args.check {
        println!("Loaded config, catalog at {}", config.catalog_url);
        let mut session = Session::new(deps.v1, deps.v2, deps.store);
        match session.try_stored_login().await {
            Ok(()) => println!("Stored login OK."),
            Err(e) => println!("Stored login failed: {}", e.diagnostics()),
        }
        return Ok(());
    }

    // -- TUI MODE (Default) --
    let mut app = UiState::new(config, VERSION, deps).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal).await;

    // Restore Terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}
