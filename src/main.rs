#[cfg(test)]
mod tests;

pub mod detector;
pub mod kpi_core;
pub mod service;

use {
    service::DEFAULT_OPS_TOKEN,
    std::time::Duration,
};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let token = std::env::var("OPS_AGENT_TOKEN").unwrap_or_else(|_| DEFAULT_OPS_TOKEN.to_string());
    let bind_addr =
        std::env::var("OPSFLOW_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5001".to_string());
    let run_timeout_secs = std::env::var("OPSFLOW_RUN_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(120);

    log::info!("🚀 Starting OpsFlow trigger service...");
    log::info!("📊 Configuration:");
    log::info!("   Bind address: {}", bind_addr);
    log::info!("   Run timeout: {}s", run_timeout_secs);
    if token == DEFAULT_OPS_TOKEN {
        log::warn!("⚠️  OPS_AGENT_TOKEN not set, using the default trigger token");
    }

    let app = service::create_router(token, Duration::from_secs(run_timeout_secs));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("✅ Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
