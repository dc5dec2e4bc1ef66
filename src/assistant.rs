use log::{ error, info, warn };
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{ JoinError, JoinHandle };

use crate::http::transport::ChatTransport;
use crate::http::{ HttpError, HttpResult };
use crate::llm::json::extract_first_content_field;
use crate::llm::payload::build_payload;
use crate::llm::AssistantConfig;
use crate::models::chat::{ ChatMessage, Conversation, RequestJob, Role };

pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "(empty response)";

/// What the chat panel should show once a request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantEvent {
    /// The reply was accepted and appended to the conversation.
    Reply {
        content: String,
    },
    /// The request failed and the conversation was rolled back.
    Failed {
        message: String,
    },
}

struct PendingRequest {
    snapshot_length: usize,
    worker: JoinHandle<Result<HttpResult, HttpError>>,
}

/// Owns the conversation and admits one request at a time.
///
/// All state changes happen on the task that owns the `Assistant`; the network
/// exchange runs on a spawned tokio task whose handle is awaited once by
/// [`Assistant::next_event`].
pub struct Assistant {
    config: Arc<AssistantConfig>,
    transport: Arc<dyn ChatTransport>,
    conversation: Conversation,
    pending: Option<PendingRequest>,
    busy_tx: watch::Sender<bool>,
}

impl Assistant {
    pub fn new(config: Arc<AssistantConfig>, transport: Arc<dyn ChatTransport>) -> Self {
        let (busy_tx, _) = watch::channel(false);
        Self {
            config,
            transport,
            conversation: Conversation::new(),
            pending: None,
            busy_tx,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Follows the busy flag so a front end can disable its input while a
    /// request is in flight.
    pub fn busy_signal(&self) -> watch::Receiver<bool> {
        self.busy_tx.subscribe()
    }

    /// Queues `prompt` for the backend. Returns `false` without touching any
    /// state if a request is already in flight or the prompt is blank.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, prompt: &str) -> bool {
        if self.is_busy() {
            warn!("Assistant is busy; dropping submission");
            return false;
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return false;
        }

        let snapshot_length = self.conversation.len();
        self.conversation.push(ChatMessage::new(Role::User, prompt));
        let job = RequestJob::new(
            build_payload(&self.config, self.conversation.messages()),
            snapshot_length
        );
        info!(
            "Sending {} message(s) to {} using model {} ({} bytes)",
            self.conversation.len(),
            self.config.host,
            self.config.model,
            job.payload_length
        );

        let transport = Arc::clone(&self.transport);
        let worker = tokio::spawn(async move { transport.post_json(&job.payload).await });
        self.pending = Some(PendingRequest { snapshot_length, worker });
        self.busy_tx.send_replace(true);

        true
    }

    /// Waits for the in-flight request and applies its outcome. Returns `None`
    /// straight away when nothing is in flight. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<AssistantEvent> {
        let pending = self.pending.as_mut()?;
        let joined = (&mut pending.worker).await;
        let snapshot_length = pending.snapshot_length;

        self.pending = None;
        self.busy_tx.send_replace(false);

        Some(match joined {
            Ok(result) => self.apply(snapshot_length, result),
            Err(e) => self.worker_lost(snapshot_length, e),
        })
    }

    /// Starts a fresh conversation. Refused while a request is in flight.
    pub fn reset(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.conversation.clear();
        info!("Conversation cleared");
        true
    }

    fn apply(&mut self, snapshot_length: usize, result: Result<HttpResult, HttpError>) -> AssistantEvent {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("Assistant request failed: {}", e);
                self.conversation.truncate(snapshot_length);
                return AssistantEvent::Failed { message: e.to_string() };
            }
        };

        if !response.is_success() {
            warn!("Assistant backend answered with status {}", response.status);
            self.conversation.truncate(snapshot_length);
            return AssistantEvent::Failed { message: status_message(&response) };
        }

        let content = extract_first_content_field(&response.body).unwrap_or_else(|| {
            warn!("No content field in {} byte response", response.body.len());
            EMPTY_RESPONSE_PLACEHOLDER.to_string()
        });
        self.conversation.push(ChatMessage::new(Role::Assistant, content.clone()));
        info!("Assistant replied ({} chars)", content.chars().count());

        AssistantEvent::Reply { content }
    }

    fn worker_lost(&mut self, snapshot_length: usize, err: JoinError) -> AssistantEvent {
        error!("Assistant request task did not finish: {}", err);
        self.conversation.truncate(snapshot_length);
        AssistantEvent::Failed { message: format!("Request failed unexpectedly: {}", err) }
    }
}

fn status_message(response: &HttpResult) -> String {
    let body = response.body_text();
    if body.is_empty() {
        format!("Status {}", response.status)
    } else {
        format!("Status {}\n{}", response.status, body)
    }
}
