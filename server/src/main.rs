use clap::Parser;
use clap_derive::Parser;
use config::{Credentials, Settings, load_env_file};
use research_core::QueryPipeline;
use research_core::logging::init_stderr_logging;
use server::{AppState, build_app};
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "research-server", author, version, about = "Research assistant HTTP and WebSocket server", long_about = None)]
struct Args {
    /// Address to bind (defaults to settings.toml, then 0.0.0.0)
    #[arg(long, env = "RESEARCH_HOST")]
    host: Option<String>,

    /// Port to listen on (defaults to settings.toml, then 5000)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();
    init_stderr_logging("info,tower_http=info,traffic=warn");

    let settings = Settings::load();
    let credentials = Credentials::from_env();
    let pipeline = QueryPipeline::from_credentials(&credentials, &settings);
    pipeline.registry().ensure_any_available()?;

    let chat_provider = credentials
        .default_provider()
        .map(str::to_string)
        .or_else(|| settings.default_provider.clone())
        .map(|provider| provider.trim().to_lowercase());
    let app = build_app(AppState::new(pipeline.clone()).with_chat_provider(chat_provider));

    let host = args.host.unwrap_or(settings.server.host);
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let providers: Vec<&str> = pipeline
        .registry()
        .list_available()
        .iter()
        .map(|id| id.as_str())
        .collect();
    info!("research server listening on {}", addr);
    info!("providers: {}", providers.join(", "));
    info!(
        "web search: {}",
        if pipeline.search().is_available() { "available" } else { "not configured" }
    );

    axum::serve(listener, app).await?;
    Ok(())
}
