//! Prints every submitted activity as `YYYY-MM-DD - title`.
//!
//! Credentials come from `MVP_API_TOKEN` and `MVP_API_EMAIL`. Set
//! `MVP_API_BASE_URL` to point at a mock server instead of production.

use mvp_activities::{ApiError, MvpActivitiesClient};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ApiError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut client = MvpActivitiesClient::new(None, None)?;
    client.initialize()?;

    for activity in client.list_submitted_activities()? {
        let date = activity.get("date").and_then(|d| d.as_str()).unwrap_or_default();
        let title = activity.get("title").and_then(|t| t.as_str()).unwrap_or_default();
        println!("{} - {title}", date.get(..10).unwrap_or(date));
    }
    Ok(())
}
