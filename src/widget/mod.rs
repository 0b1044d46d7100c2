use log::warn;
use reqwest::Client as HttpClient;
use serde_json::json;
use std::error::Error;
use tokio::io::{ self, AsyncBufReadExt, AsyncWriteExt, BufReader };

use crate::cli::Args;
use crate::models::chat::{ ChatMessage, ChatReply, Role };
use crate::sanitize::{ wants_scheduling_cta, LinkScrubber };

/// Terminal rendition of the site chat widget: append-only history,
/// full history sent on every turn, scheduling call-to-action rendered
/// under matching replies.
pub struct ChatWidget {
    history: Vec<ChatMessage>,
    in_flight: bool,
    chat_url: String,
    scheduling_url: String,
    scrubber: LinkScrubber,
    http: HttpClient,
}

/// What the widget renders for one assistant reply.
#[derive(Debug, PartialEq)]
pub struct WidgetReply {
    pub text: String,
    pub show_scheduling_cta: bool,
}

impl ChatWidget {
    pub fn new(
        api_base_url: &str,
        scheduling_url: &str,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            history: Vec::new(),
            in_flight: false,
            chat_url: format!("{}/api/chat", api_base_url.trim_end_matches('/')),
            scheduling_url: scheduling_url.to_string(),
            scrubber: LinkScrubber::for_scheduling_url(scheduling_url)?,
            http: HttpClient::new(),
        })
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn scheduling_url(&self) -> &str {
        &self.scheduling_url
    }

    /// One turn: append the draft as a user message and send the whole
    /// history to the server. Blank drafts are a no-op. On failure the
    /// turn renders nothing; the failed call is logged, the in-flight
    /// flag clears, and the user is free to retry. The sequential
    /// `&mut self` call is what makes the debounce hard rather than
    /// advisory.
    pub async fn send(&mut self, draft: &str) -> Option<WidgetReply> {
        if draft.trim().is_empty() {
            return None;
        }

        self.history.push(ChatMessage::new(Role::User, draft.trim()));
        self.in_flight = true;
        let result = self.round_trip().await;
        self.in_flight = false;

        match result {
            Ok(reply) => {
                // Scrubbed again client-side in case the server missed one.
                let text = self.scrubber.scrub(&reply.reply);
                self.history.push(ChatMessage::new(Role::Assistant, text.clone()));
                let show_scheduling_cta = wants_scheduling_cta(&text);
                Some(WidgetReply { text, show_scheduling_cta })
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                None
            }
        }
    }

    async fn round_trip(&self) -> Result<ChatReply, Box<dyn Error + Send + Sync>> {
        let reply = self.http
            .post(&self.chat_url)
            .json(&json!({ "messages": self.history }))
            .send()
            .await?
            .error_for_status()?
            .json::<ChatReply>()
            .await?;
        Ok(reply)
    }
}

/// Interactive loop for `--mode widget`.
pub async fn run_widget(args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut widget = ChatWidget::new(&args.api_base_url, &args.scheduling_url)?;
    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    let mut lines = stdin.lines();

    println!("Concierge chat. Type a message, or /quit to exit.");
    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        match widget.send(&line).await {
            Some(reply) => {
                println!("assistant> {}", reply.text);
                if reply.show_scheduling_cta {
                    println!("  [Book an intro call: {}]", widget.scheduling_url());
                }
            }
            None => {
                if !line.trim().is_empty() {
                    println!("(no reply, please try again)");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> ChatWidget {
        ChatWidget::new("http://127.0.0.1:1", "https://calendly.com/acme-studio/intro-call")
            .unwrap()
    }

    #[tokio::test]
    async fn blank_draft_is_a_noop() {
        let mut w = widget();
        assert!(w.send("   ").await.is_none());
        assert!(w.history().is_empty());
        assert!(!w.is_in_flight());
    }

    #[tokio::test]
    async fn failed_send_keeps_history_and_clears_the_flag() {
        // Port 1 refuses the connection, standing in for a dead server.
        let mut w = widget();
        assert!(w.send("hello?").await.is_none());
        assert_eq!(w.history().len(), 1);
        assert_eq!(w.history()[0].role, Role::User);
        assert_eq!(w.history()[0].content, "hello?");
        assert!(!w.is_in_flight());
    }
}
