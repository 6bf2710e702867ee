use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use car_rental_client::config::Config;
use car_rental_client::controller::App;
use car_rental_client::repositories::rental_api_repo::RentalApiRepo;
use car_rental_client::repositories::session_store::FileSessionStore;
use car_rental_client::session::Session;
use car_rental_client::shell::Shell;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    let session_dir = config
        .session_dir()
        .context("Failed to resolve session directory")?;
    info!("Using rental backend at {}", config.api_base_url);

    let session = Session::restore(FileSessionStore::new(session_dir));
    let api = RentalApiRepo::new(&config.api_base_url);
    let app = App::new(api, session);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::new(app, stdin.lock(), stdout.lock());
    shell.run().await
}
