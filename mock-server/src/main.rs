use mock_server::{sample_activity, MockBackend, MockConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let seeded: u64 = std::env::var("MOCK_SEED_ACTIVITIES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let config = MockConfig {
        activities: (1..=seeded).map(sample_activity).collect(),
        ..MockConfig::default()
    };
    info!(token = %config.token, email = %config.email, seeded, "mock identity");

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::run(listener, MockBackend::new(config)).await
}
