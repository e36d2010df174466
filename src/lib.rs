pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod relay;
pub mod widget;

use cli::Args;
use llm::{ LlmConfig, LlmType };
use llm::chat::new_client as new_chat_client;
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::time::Duration;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_llm_type = args.chat_llm_type.parse::<LlmType>()?;
    let chat_api_key = if !args.chat_api_key.is_empty() {
        Some(args.chat_api_key.clone())
    } else {
        None
    };
    let chat_config = LlmConfig {
        llm_type: chat_llm_type,
        base_url: args.chat_base_url.clone(),
        api_key: chat_api_key,
        completion_model: args.chat_model.clone(),
    };

    info!("--- Relay Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", chat_config.llm_type);
    info!("Chat Model: {}", chat_config.completion_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", chat_config.base_url.as_deref().unwrap_or("adapter default"));
    info!("Provider Timeout: {}s", args.chat_timeout_secs);
    info!("Max Body Bytes: {}", args.max_body_bytes);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let chat_client = new_chat_client(&chat_config)?;
    let timeout = match args.chat_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let relay = Relay::new(chat_client, timeout);

    let server = Server::new(args.server_addr.clone(), relay, args);
    server.run().await?;

    Ok(())
}
