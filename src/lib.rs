pub mod assistant;
pub mod models;
pub mod cli;
pub mod http;
pub mod llm;
pub mod repl;

use assistant::Assistant;
use cli::Args;
use http::transport::TlsTransport;
use log::info;
use std::error::Error;
use std::sync::Arc;
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Arc::new(args.to_config());

    info!("--- Assistant Configuration ---");
    info!("Model: {}", config.model);
    info!("Endpoint: https://{}{}", config.host, config.path);
    info!("Referrer: {}", config.referrer);
    info!("User-Agent: {}", config.user_agent);
    if let Some(path) = &args.transcript {
        info!("Transcript: {}", path.display());
    }
    info!("-------------------------------");

    let transport = Arc::new(TlsTransport::from_config(&config)?);
    let mut assistant = Assistant::new(config, transport);

    let stdin = BufReader::new(tokio::io::stdin());
    repl::run_chat(&mut assistant, stdin, tokio::io::stdout()).await?;

    if let Some(path) = &args.transcript {
        assistant.conversation().save_json(path)?;
        info!(
            "Saved {} message(s) to {}",
            assistant.conversation().len(),
            path.display()
        );
    }

    Ok(())
}
