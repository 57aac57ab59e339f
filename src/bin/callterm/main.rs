//! Terminal front end for placing assistant calls and reading back their results.

use anyhow::Result;
use callterm::ui::run_ui;
use callterm::{init_logging, init_tracing, log_debug, log_file_path};
use callterm::{AppConfig, CallApp, CallClient};
use clap::Parser;

/// Parse CLI arguments, bootstrap the call client, and launch the UI.
fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_logging(&config);
    init_tracing(&config);

    let service = config.resolve()?;
    if config.check_config {
        for line in service.summary_lines() {
            println!("{line}");
        }
        return Ok(());
    }

    log_debug("=== callterm started ===");
    log_debug(&format!("log file: {}", log_file_path().display()));
    tracing::info!(api_url = %service.api_url, "callterm starting");

    let client = CallClient::init(&service)?;
    let result = {
        let mut app = CallApp::mount(&client);
        let result = run_ui(&mut app);
        app.unmount();
        result
    };
    client.shutdown();

    log_debug("=== callterm exiting ===");
    if let Err(ref err) = result {
        log_debug(&format!("exit with error: {err:#}"));
    }
    result
}
