//! NutriLens — terminal dashboard entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use nutrilens::config::Cli;
use nutrilens::session::Session;
use nutrilens::store::FileStore;
use nutrilens::tui::App;
use nutrilens::upload::HttpClassifier;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.resolve();

    if let Err(e) = nutrilens::logging::init_tracing(&config.log_dir) {
        eprintln!(
            "warning: logging disabled ({}): {e}",
            config.log_dir.display()
        );
    }
    info!(
        endpoint = %config.endpoint,
        store = %config.store_path.display(),
        "starting nutrilens v{}",
        env!("CARGO_PKG_VERSION")
    );

    let classifier = match HttpClassifier::new(&config.endpoint, config.timeout()) {
        Ok(classifier) => classifier,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            eprintln!("error: could not create HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let session = Session::start(Box::new(FileStore::new(config.store_path.clone())));
    let mut app = App::new(session, Arc::new(classifier));
    if let Some(image) = &cli.image {
        app.upload_path(image);
    }

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    match result {
        Ok(()) => {
            info!("exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "terminal error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
