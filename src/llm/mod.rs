pub mod json;
pub mod payload;

use std::str::FromStr;
use std::fmt;

pub const DEFAULT_HOST: &str = "text.pollinations.ai";
pub const DEFAULT_PATH: &str = "/openai";
pub const DEFAULT_REFERRER: &str = "https://flow-editor.app";
pub const DEFAULT_USER_AGENT: &str = concat!("Flow/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are the assistant built into Flow, a text and code editor. \
     Answer clearly and concisely. Use fenced code blocks for code.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Model {
    #[default]
    Openai,
    OpenaiLarge,
    Mistral,
    QwenCoder,
}

impl Model {
    pub const ALL: [Model; 4] = [Model::Openai, Model::OpenaiLarge, Model::Mistral, Model::QwenCoder];

    pub fn name(&self) -> &'static str {
        match self {
            Model::Openai => "openai",
            Model::OpenaiLarge => "openai-large",
            Model::Mistral => "mistral",
            Model::QwenCoder => "qwen-coder",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseModelError {
    message: String,
}

impl fmt::Display for ParseModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseModelError {}

impl FromStr for Model {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Model::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Model::ALL.iter().map(|m| m.name()).collect();
                ParseModelError {
                    message: format!("Invalid model: '{}' (expected one of: {})", s, known.join(", ")),
                }
            })
    }
}

/// Everything the assistant needs to talk to its backend. Built once at
/// startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub model: Model,
    pub host: String,
    pub path: String,
    pub referrer: String,
    pub user_agent: String,
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: Model::default(),
            host: DEFAULT_HOST.to_string(),
            path: DEFAULT_PATH.to_string(),
            referrer: DEFAULT_REFERRER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_models() {
        assert_eq!("openai".parse::<Model>(), Ok(Model::Openai));
        assert_eq!("OpenAI-Large".parse::<Model>(), Ok(Model::OpenaiLarge));
        assert_eq!(" mistral ".parse::<Model>(), Ok(Model::Mistral));
        assert_eq!("qwen-coder".parse::<Model>(), Ok(Model::QwenCoder));
    }

    #[test]
    fn rejects_unknown_model() {
        let err = "gpt-9".parse::<Model>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid model: 'gpt-9'"));
        assert!(err.to_string().contains("qwen-coder"));
    }

    #[test]
    fn names_round_trip() {
        for model in Model::ALL {
            assert_eq!(model.name().parse::<Model>(), Ok(model));
        }
        assert_eq!(Model::default(), Model::Openai);
    }
}
