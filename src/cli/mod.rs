use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- General App Args ---
    /// Run mode: "serve" starts the HTTP endpoint, "widget" starts the terminal chat client.
    #[arg(long, env = "AGENT_MODE", default_value = "serve")]
    pub mode: String,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Path to an optional JSON prompt override file. The built-in
    /// system prompt is used when the file does not exist.
    #[arg(long, env = "PROMPTS_PATH", default_value = "json/prompts.json")]
    pub prompts_path: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, anthropic, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider (e.g., OpenAI, Anthropic)
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-4o-mini, claude-3-5-haiku-latest)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    // --- Lead Capture Args ---
    /// Webhook URL that receives lead notifications. Lead capture is
    /// disabled when unset.
    #[arg(long, env = "LEAD_WEBHOOK_URL")]
    pub lead_webhook_url: Option<String>,

    /// External scheduling link offered to prospects. Its domain is also
    /// what gets scrubbed out of model replies.
    #[arg(long, env = "SCHEDULING_URL", default_value = "https://calendly.com/acme-studio/intro-call")]
    pub scheduling_url: String,

    // --- CORS Args ---
    /// Comma-separated list of origins allowed to call the endpoint.
    /// Unset means any origin is allowed.
    #[arg(long, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    /// Origin returned when the request origin is not in the allow list.
    /// Defaults to the first entry of the allow list.
    #[arg(long, env = "DEFAULT_ORIGIN")]
    pub default_origin: Option<String>,

    // --- Widget Args ---
    /// Base URL the widget sends chat turns to.
    #[arg(long, env = "API_BASE_URL", default_value = "http://127.0.0.1:4000")]
    pub api_base_url: String,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
