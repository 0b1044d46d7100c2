pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod notify;
pub mod sanitize;
pub mod server;
pub mod widget;

use agent::ConciergeAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Mode: {}", args.mode);
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Prompts Path: {}", args.prompts_path);
    info!("Scheduling URL: {}", args.scheduling_url);
    info!("Lead Webhook Configured: {}", args.lead_webhook_url.is_some());
    info!("Allowed Origins: {}", args.allowed_origins.as_deref().unwrap_or("(any)"));
    info!("-------------------------");

    if args.mode == "widget" {
        return widget::run_widget(&args).await;
    }

    let agent = Arc::new(ConciergeAgent::new(&args)?);
    let server = Server::new(agent, args);
    server.run().await?;

    Ok(())
}
