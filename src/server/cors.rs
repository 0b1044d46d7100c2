/// Allow-origin policy for the chat endpoint. `None` allow-set means
/// any origin; otherwise the request origin is echoed when listed, and
/// everyone else gets the configured default.
#[derive(Clone, Debug)]
pub struct CorsPolicy {
    allowed: Option<Vec<String>>,
    default_origin: Option<String>,
}

/// The computed header value plus whether the response varies by the
/// request's Origin header.
#[derive(Debug, PartialEq, Eq)]
pub struct AllowOrigin {
    pub value: String,
    pub vary_by_origin: bool,
}

pub const ALLOW_METHODS: &str = "POST, OPTIONS, GET";
pub const ALLOW_HEADERS: &str = "Content-Type";

impl CorsPolicy {
    /// `allowed_origins` is the comma-separated allow list from config;
    /// unset (or blank) opens the endpoint to any origin.
    pub fn from_config(allowed_origins: Option<&str>, default_origin: Option<&str>) -> Self {
        let allowed = allowed_origins
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        Self {
            allowed,
            default_origin: default_origin.map(|s| s.to_string()),
        }
    }

    pub fn allow_any() -> Self {
        Self { allowed: None, default_origin: None }
    }

    pub fn resolve(&self, request_origin: Option<&str>) -> AllowOrigin {
        let Some(allowed) = &self.allowed else {
            return AllowOrigin { value: "*".to_string(), vary_by_origin: false };
        };

        if let Some(origin) = request_origin {
            if allowed.iter().any(|a| a == origin) {
                return AllowOrigin { value: origin.to_string(), vary_by_origin: true };
            }
        }

        let fallback = self.default_origin
            .clone()
            .unwrap_or_else(|| allowed[0].clone());
        AllowOrigin { value: fallback, vary_by_origin: true }
    }
}
