use clap::Parser;
use std::path::PathBuf;

use crate::llm::{ AssistantConfig, Model, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_REFERRER, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_AGENT };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Chat with Flow's built-in assistant from the terminal", long_about = None)]
pub struct Args {
    /// Model to ask (openai, openai-large, mistral, qwen-coder)
    #[arg(short, long, env = "FLOW_MODEL", default_value = "openai")]
    pub model: Model,

    /// Host of the chat completion API. Always reached over HTTPS on port 443.
    #[arg(long, env = "FLOW_API_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Request path on the API host.
    #[arg(long, env = "FLOW_API_PATH", default_value = DEFAULT_PATH)]
    pub path: String,

    /// Referrer sent in every request body.
    #[arg(long, env = "FLOW_REFERRER", default_value = DEFAULT_REFERRER)]
    pub referrer: String,

    /// System prompt placed ahead of the conversation in every request.
    #[arg(long, env = "FLOW_SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Write the conversation as JSON to this file on exit.
    #[arg(long, env = "FLOW_TRANSCRIPT")]
    pub transcript: Option<PathBuf>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn to_config(&self) -> AssistantConfig {
        AssistantConfig {
            model: self.model,
            host: self.host.clone(),
            path: self.path.clone(),
            referrer: self.referrer.clone(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_prompt: self.system_prompt.clone(),
        }
    }
}
