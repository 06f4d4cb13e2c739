use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use interview_proctor::classifier::ScriptedScanner;
use interview_proctor::media::{ClockSink, SyntheticDevices};
use interview_proctor::resume::ResumeStore;
use interview_proctor::transport::DialogueChannel;
use interview_proctor::{create_router, AppState, Config, InterviewEngine};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "interview-proctor", about = "Proctored interview session engine")]
struct Args {
    /// Path to the configuration file (extension optional)
    #[arg(short, long, default_value = "config/interview-proctor")]
    config: String,

    /// Override the HTTP bind address (host:port)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    info!("Interview Proctor v0.1.0");
    info!("Loaded config: {}", config.service.name);

    let addr = args
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.service.http.bind, config.service.http.port));

    // The dialogue channel is opened once and held for the process
    // lifetime; there is no reconnect.
    let (channel, inbound) = DialogueChannel::connect(&config.backend.url)
        .await
        .context("Failed to connect to the dialogue backend")?;
    let channel = Arc::new(channel);

    let resume = Arc::new(ResumeStore::new(config.resume.storage_path.clone()));

    let engine = InterviewEngine::new(
        config.clone(),
        Box::new(SyntheticDevices::new()),
        Arc::new(ClockSink::new()),
        Arc::clone(&channel),
        inbound,
    );

    // Load the classifier in the background; session start is rejected
    // until it lands.
    let loader = Arc::clone(&engine);
    let script_path = config.classifier.script_path.clone();
    tokio::spawn(async move {
        match script_path {
            Some(path) => match ScriptedScanner::load(&path).await {
                Ok(scanner) => loader.install_scanner(Box::new(scanner)).await,
                Err(e) => error!("Classifier load failed, sessions stay disabled: {}", e),
            },
            None => {
                // No script configured: replay a single attentive face.
                let frames = vec![vec![HashMap::new()]];
                loader
                    .install_scanner(Box::new(ScriptedScanner::from_frames(frames)))
                    .await;
            }
        }
    });

    let state = AppState::new(Arc::clone(&engine), resume);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down");
    engine.end_session().await.ok();
    channel.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Received shutdown signal");
}
