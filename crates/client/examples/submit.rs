//! Submit one generation job and print its asynchronously delivered
//! result.
//!
//! Reads gateway, relay, and credential settings from the environment:
//!
//! ```sh
//! ATELIER_GATEWAY_URL=https://api.example.com \
//! ATELIER_GATEWAY_KEY=... \
//! ATELIER_RELAY_KEY=... \
//! ATELIER_APP_ID=... ATELIER_APP_KEY=... \
//! ATELIER_APP_USER_ID=... ATELIER_APP_USER_TOKEN=... \
//! cargo run --example submit -- "a lighthouse at dusk"
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_client::{Client, ClientConfig};
use atelier_core::job::{JobConfig, StableDiffusionConfig};
use atelier_core::types::AppCredentials;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_client=debug,atelier_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a lighthouse at dusk".to_string());

    let credentials = AppCredentials {
        app_id: std::env::var("ATELIER_APP_ID").expect("ATELIER_APP_ID must be set"),
        key: std::env::var("ATELIER_APP_KEY").expect("ATELIER_APP_KEY must be set"),
        app_user_id: std::env::var("ATELIER_APP_USER_ID").expect("ATELIER_APP_USER_ID must be set"),
        app_user_token: std::env::var("ATELIER_APP_USER_TOKEN")
            .expect("ATELIER_APP_USER_TOKEN must be set"),
    };

    let client = Client::connect(ClientConfig::from_env(), credentials, None).await?;

    for service in client.services().iter() {
        tracing::info!(id = %service.id, name = %service.name, "Available service");
    }

    let config = JobConfig::StableDiffusion(StableDiffusionConfig::new(prompt));
    let job_id = client.submit("stable_diffusion", &config).await?;
    println!("Submitted job {job_id}");

    let (tx, mut rx) = tokio::sync::mpsc::channel(1);
    let _subscription = client.subscribe_to_result(&job_id, move |payload| {
        let _ = tx.try_send(payload);
    });

    match rx.recv().await {
        Some(result) => println!("Result: {result}"),
        None => eprintln!("Result channel closed without a payload"),
    }

    client.shutdown().await;
    Ok(())
}
