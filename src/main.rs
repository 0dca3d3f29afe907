use ohana_calendar::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Ohana calendar service");

    // Load configuration; an unreadable credentials file aborts here
    let config = startup::load_config()?;

    // Serve until shutdown
    startup::start_server(config).await
}
