use feedback_miniapp::api::{MiniAppClient, launch_target};
use feedback_miniapp::cli::MiniAppCli;
use feedback_miniapp::config::MiniAppConfig;
use feedback_miniapp::flow::{AnswerFlow, SwipeTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = MiniAppConfig::from_env();

    eprintln!("💬 Feedback mini-app v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_url);
    eprintln!(
        "   Not ratable: {}",
        if config.disallowed_suffixes.is_empty() {
            "(none)".to_string()
        } else {
            config
                .disallowed_suffixes
                .iter()
                .map(|s| format!("*{s}"))
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    eprintln!("   Type 'help' for commands, 'quit' to exit.\n");

    let client = MiniAppClient::new(&config)?;
    let flow = AnswerFlow::new(
        config.target_policy(),
        SwipeTracker::new(config.swipe_threshold),
    );

    let prefill = config.launch_url.as_deref().and_then(launch_target);
    if let Some(ref target) = prefill {
        tracing::info!(handle = %target, "Launched with a prefilled target");
    }

    let mut cli = MiniAppCli::new(client, flow);
    cli.run(prefill).await?;

    Ok(())
}
