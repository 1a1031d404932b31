use std::time::Duration;

use cineforge_core::task::CorrelationMode;
use cineforge_gemini::GeminiConfig;
use cineforge_kie::KieConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the provider API keys have sensible defaults for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public base URL of this service, used to build the callback URLs
    /// handed to the generation provider.
    pub public_base_url: String,
    /// Callback correlation strategy for newly created tasks.
    pub correlation_mode: CorrelationMode,
    /// Number of background submission workers (default: `4`).
    pub submit_workers: usize,
    /// Capacity of the submission queue (default: `64`).
    pub submit_queue_depth: usize,
    /// Kie.ai connection settings.
    pub kie: KieConfig,
    /// Gemini connection settings.
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                        |
    /// |------------------------|------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                      |
    /// | `PORT`                 | `3000`                                         |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                           |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`                        |
    /// | `CORRELATION_MODE`     | `embedded`                                     |
    /// | `SUBMIT_WORKERS`       | `4`                                            |
    /// | `SUBMIT_QUEUE_DEPTH`   | `64`                                           |
    /// | `KIE_API_URL`          | `https://api.kie.ai`                           |
    /// | `KIE_API_KEY`          | (empty)                                        |
    /// | `GEMINI_API_URL`       | `https://generativelanguage.googleapis.com`    |
    /// | `GEMINI_API_KEY`       | (empty)                                        |
    /// | `GEMINI_MODEL`         | `gemini-2.5-flash`                             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        let correlation_mode: CorrelationMode = std::env::var("CORRELATION_MODE")
            .unwrap_or_else(|_| "embedded".into())
            .parse()
            .expect("CORRELATION_MODE must be 'embedded' or 'linked'");

        let submit_workers: usize = std::env::var("SUBMIT_WORKERS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("SUBMIT_WORKERS must be a valid usize");

        let submit_queue_depth: usize = std::env::var("SUBMIT_QUEUE_DEPTH")
            .unwrap_or_else(|_| "64".into())
            .parse()
            .expect("SUBMIT_QUEUE_DEPTH must be a valid usize");

        let kie = KieConfig {
            base_url: std::env::var("KIE_API_URL")
                .unwrap_or_else(|_| "https://api.kie.ai".into()),
            api_key: std::env::var("KIE_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(request_timeout_secs),
        };

        let gemini = GeminiConfig {
            base_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            timeout: Duration::from_secs(request_timeout_secs),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            correlation_mode,
            submit_workers,
            submit_queue_depth,
            kie,
            gemini,
        }
    }
}
