use agentbridge_search::{handle_invocation, SearchConfig, SearchInvocation, SearchResponseEnvelope, YouTubeClient};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    // CloudWatch adds its own timestamps and does not render ANSI colours.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = SearchConfig::from_env()?;
    info!("Search function starting: {:?}", config);

    let client = YouTubeClient::new(config.search_url.clone(), config.api_key.clone(), config.timeout)?;
    let client = &client;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<SearchInvocation>| async move {
        let envelope: SearchResponseEnvelope = handle_invocation(client, event.payload).await?;
        Ok::<_, Error>(envelope)
    }))
    .await
}
