use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

/// Baked-in system instruction, used unless a prompt file overrides it.
/// `{scheduling_link}` is rendered once at agent construction.
const DEFAULT_SYSTEM_PROMPT: &str = "\
You are the studio's website assistant, a friendly and knowledgeable guide \
for prospective clients. Your goals, in order:
1. Understand what the visitor needs and qualify it: ask about their project, \
budget, and timeline when it comes up naturally.
2. Explain the studio's services (web design, branding, custom development) \
plainly and accurately. Never invent services, prices, or delivery dates.
3. When the visitor shows real interest, offer to schedule an intro call at \
{scheduling_link}, or ask for their name and email so the team can follow up.
4. On clear purchase intent, try to collect name, email, company, budget, \
timeline, and country, one or two at a time, without interrogating.
If you are uncertain what the visitor means, ask at most one clarifying \
question. Keep every reply short, warm, and professional.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template '{0}' is empty")]
    EmptyTemplate(String),
    #[error("Prompt file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub system_prompt: String,
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.system_prompt.trim().is_empty() {
            return Err(PromptError::EmptyTemplate("system_prompt".to_string()));
        }
        Ok(())
    }

    /// Substitutes the scheduling link into the template.
    pub fn render_system(&self, scheduling_url: &str) -> String {
        self.system_prompt.replace("{scheduling_link}", scheduling_url)
    }
}

/// Loads the prompt override file when it exists, otherwise the
/// built-in default. A present-but-broken file is an error, not a
/// silent fallback.
pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    if !Path::new(path).exists() {
        info!("Prompt file '{}' not found, using built-in system prompt", path);
        return Ok(Arc::new(PromptConfig {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }));
    }

    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt configuration from '{}'", path);
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = load_prompts("no/such/prompts.json").unwrap();
        assert!(config.system_prompt.contains("{scheduling_link}"));
    }

    #[test]
    fn render_substitutes_the_scheduling_link() {
        let config = PromptConfig {
            system_prompt: "Offer {scheduling_link} politely.".to_string(),
        };
        assert_eq!(
            config.render_system("https://calendly.com/acme"),
            "Offer https://calendly.com/acme politely."
        );
    }

    #[test]
    fn blank_template_is_rejected() {
        let config = PromptConfig { system_prompt: "  ".to_string() };
        assert!(config.validate().is_err());
    }
}
