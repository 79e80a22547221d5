mod auth;
mod config;
mod error;
mod providers;
mod report;
mod window;

use auth::InstalledFlowAuthorizer;
use config::Config;
use env_logger;
use providers::google::{self, fitness_v1_types::FitnessScopes, GoogleFitProvider};
use std::sync::Arc;

async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let https_client = google::https_client();
    let authorizer = InstalledFlowAuthorizer::new(
        https_client.clone(),
        &config.client_secret_path,
        &config.token_file(),
        &FitnessScopes::all_read()[..],
    )
    .await?;
    let gfit = GoogleFitProvider::new(https_client, Arc::new(authorizer), config.user_id.clone());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let shown = report::run(&config, &gfit, &mut out, chrono::Utc::now).await?;
    log::info!("printed {} {} source(s)", shown, config.data_type);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let result = match Config::from_env() {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let kind = error::classify(&e);
        log::error!("{} failure: {}", kind, e);
        eprintln!("{} failure: {:?}", kind, e);
        std::process::exit(1);
    }
}
