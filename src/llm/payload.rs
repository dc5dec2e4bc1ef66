use super::json::escape_json_string;
use super::AssistantConfig;
use crate::models::chat::{ ChatMessage, Role };

/// Serializes a chat-completion request. Field order is fixed:
/// `model`, `messages` (system prompt first), `stream`, `referrer`.
pub fn build_payload(config: &AssistantConfig, history: &[ChatMessage]) -> Vec<u8> {
    let mut out = String::with_capacity(256 + history.iter().map(|m| m.content.len() + 32).sum::<usize>());

    out.push_str("{\"model\":\"");
    out.push_str(&escape_json_string(config.model.name()));
    out.push_str("\",\"messages\":[");

    push_message(&mut out, Role::System, &config.system_prompt);
    for message in history {
        out.push(',');
        push_message(&mut out, message.role, &message.content);
    }

    out.push_str("],\"stream\":false,\"referrer\":\"");
    out.push_str(&escape_json_string(&config.referrer));
    out.push_str("\"}");

    out.into_bytes()
}

fn push_message(out: &mut String, role: Role, content: &str) {
    out.push_str("{\"role\":\"");
    out.push_str(role.as_str());
    out.push_str("\",\"content\":\"");
    out.push_str(&escape_json_string(content));
    out.push_str("\"}");
}
