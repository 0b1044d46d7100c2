use chrono::Utc;
use log::{ info, warn };
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig };
use crate::llm::{ parse_llm_type, LlmConfig };
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::models::chat::{ ChatMessage, ChatRequest, LeadInfo, LeadNotification, Role };
use crate::notify::{ LeadNotifier, WebhookNotifier, NOTIFICATION_SOURCE };
use crate::sanitize::{ detect_lead, LinkScrubber };

/// How many trailing messages of the conversation are forwarded to the
/// provider. The client keeps the full history for display; the server
/// only ever sees this suffix.
const CONVERSATION_WINDOW: usize = 12;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("chat provider credential is not configured")]
    MissingCredential,
    #[error("chat provider request failed: {0}")]
    Provider(String),
}

/// Returns the most recent `limit` messages, order preserved.
pub fn conversation_window(messages: &[ChatMessage], limit: usize) -> &[ChatMessage] {
    let start = messages.len().saturating_sub(limit);
    &messages[start..]
}

pub struct ConciergeAgent {
    chat_client: Option<Arc<dyn ChatClient>>,
    system_prompt: String,
    scrubber: LinkScrubber,
    notifier: Option<Arc<dyn LeadNotifier>>,
}

impl ConciergeAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_type = parse_llm_type(&args.chat_llm_type)?;
        let api_key = if !args.chat_api_key.is_empty() {
            Some(args.chat_api_key.clone())
        } else {
            None
        };
        let chat_config = LlmConfig {
            llm_type,
            base_url: args.chat_base_url.clone(),
            api_key,
            completion_model: args.chat_model.clone(),
        };

        // A missing credential must not stop the server from coming up;
        // chat turns report it as a configuration failure instead.
        let chat_client = match new_chat_client(&chat_config) {
            Ok(client) => {
                info!(
                    "Chat client configured: Type={}, Model={}, BaseURL={:?}",
                    args.chat_llm_type,
                    client.get_model(),
                    client.get_base_url()
                );
                Some(client)
            }
            Err(e) => {
                warn!("Chat client not configured ({}); chat turns will fail until it is", e);
                None
            }
        };

        let prompt_config: Arc<PromptConfig> = prompt::load_prompts(&args.prompts_path)?;
        let system_prompt = prompt_config.render_system(&args.scheduling_url);
        let scrubber = LinkScrubber::for_scheduling_url(&args.scheduling_url)?;

        let notifier: Option<Arc<dyn LeadNotifier>> = match &args.lead_webhook_url {
            Some(url) => {
                info!("Lead webhook configured: {}", url);
                Some(Arc::new(WebhookNotifier::new(url)?))
            }
            None => {
                info!("No lead webhook configured, lead notifications disabled");
                None
            }
        };

        Ok(Self {
            chat_client,
            system_prompt,
            scrubber,
            notifier,
        })
    }

    /// Assembles an agent from pre-built pieces. Tests use this to swap
    /// in mock clients and notifiers.
    pub fn from_parts(
        chat_client: Option<Arc<dyn ChatClient>>,
        system_prompt: String,
        scrubber: LinkScrubber,
        notifier: Option<Arc<dyn LeadNotifier>>,
    ) -> Self {
        Self {
            chat_client,
            system_prompt,
            scrubber,
            notifier,
        }
    }

    /// One chat turn: window the history, prepend the system prompt,
    /// call the provider once, scrub the reply, and fire the lead
    /// webhook when the heuristics say so. The webhook outcome never
    /// changes the returned reply.
    pub async fn handle_turn(&self, request: &ChatRequest) -> Result<String, AgentError> {
        let client = self.chat_client.as_ref().ok_or(AgentError::MissingCredential)?;
        let turn_id = Uuid::new_v4();

        let window = conversation_window(&request.messages, CONVERSATION_WINDOW);
        let mut outbound = Vec::with_capacity(window.len() + 1);
        outbound.push(ChatMessage::new(Role::System, self.system_prompt.clone()));
        outbound.extend_from_slice(window);

        info!(
            "[{}] chat turn: {} message(s) received, {} forwarded",
            turn_id,
            request.messages.len(),
            window.len()
        );

        let completion = client
            .complete(&outbound).await
            .map_err(|e| AgentError::Provider(e.to_string()))?;
        let raw_reply = completion.response;
        let reply = self.scrubber.scrub(&raw_reply);

        if detect_lead(&raw_reply, &request.lead) {
            self.dispatch_lead(turn_id, &request.lead, &raw_reply).await;
        }

        Ok(reply)
    }

    // Lead detection fired. Awaited so a turn attempts at most one
    // delivery, but the result is only logged.
    async fn dispatch_lead(
        &self,
        turn_id: Uuid,
        lead: &LeadInfo,
        raw_reply: &str,
    ) {
        let Some(notifier) = &self.notifier else {
            info!("[{}] lead signal detected, no webhook configured", turn_id);
            return;
        };

        let notification = LeadNotification {
            source: NOTIFICATION_SOURCE.to_string(),
            lead: lead.clone(),
            raw_reply: raw_reply.to_string(),
            when: Utc::now(),
        };

        match notifier.notify(&notification).await {
            Ok(()) => info!("[{}] lead notification delivered", turn_id),
            Err(e) => warn!("[{}] lead notification failed: {}", turn_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn msgs(n: usize) -> Vec<ChatMessage> {
        (0..n).map(|i| ChatMessage::new(Role::User, format!("m{}", i))).collect()
    }

    #[test]
    fn short_histories_pass_through_whole() {
        let history = msgs(5);
        let window = conversation_window(&history, 12);
        assert_eq!(window, &history[..]);
    }

    #[test]
    fn long_histories_keep_only_the_suffix() {
        let history = msgs(15);
        let window = conversation_window(&history, 12);
        assert_eq!(window.len(), 12);
        assert_eq!(window[0].content, "m3");
        assert_eq!(window[11].content, "m14");
    }

    #[test]
    fn empty_history_yields_empty_window() {
        assert!(conversation_window(&[], 12).is_empty());
    }
}
