use anyhow::Context;

use advisory_site::announcer;
use advisory_site::config::SiteConfig;
use advisory_site::server::SiteServices;
use advisory_site::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = SiteConfig::from_env().context("invalid configuration")?;

    let missing = config.missing_required();
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.join(", "),
            "Missing required environment variables; contact form will report a configuration error"
        );
    }

    let port = config.port;
    eprintln!("Advisory Site v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Site:       {}", config.base_url);
    eprintln!("   HTTP:       http://0.0.0.0:{port}");
    eprintln!("   Live region ws://0.0.0.0:{port}/ws/announcements");
    eprintln!("   Scheduling: {}", config.calendly_base_url);

    let telemetry = telemetry::init();
    let services = SiteServices::new(
        config,
        announcer::global().clone(),
        telemetry.errors.clone(),
        telemetry.analytics.clone(),
    )
    .context("failed to build services")?;
    let _prune_handles = services.spawn_background_tasks();
    let app = services.router();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(port, "Advisory site server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("server error")?;

    telemetry::shutdown().await;
    Ok(())
}
