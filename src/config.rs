use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub environment: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,

    pub anthropic_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// Outbound model call timeout. 0 disables the timeout.
    pub llm_timeout_secs: u64,

    pub canonicalize_tags: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| "Squircle API".into()),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            debug: parse_or("DEBUG", get("DEBUG"), true, "true or false")?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("PORT", get("PORT"), 8000, "a port number")?,
            cors_origins: get("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .transpose()?
                .unwrap_or_else(|| vec!["*".into()]),

            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            llm_base_url: get("LLM_BASE_URL")
                .unwrap_or_else(|| "https://api.anthropic.com".into())
                .trim_end_matches('/')
                .to_string(),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| "claude-3-haiku-20240307".into()),
            llm_temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.3, "a number")?,
            llm_max_tokens: parse_or(
                "LLM_MAX_TOKENS",
                get("LLM_MAX_TOKENS"),
                500,
                "a positive integer",
            )?,
            llm_timeout_secs: parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), 30, "seconds")?,

            canonicalize_tags: parse_or(
                "CANONICALIZE_TAGS",
                get("CANONICALIZE_TAGS"),
                false,
                "true or false",
            )?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key,
                value,
                expected,
            }),
    }
}

/// Accepts either a comma separated list or a JSON array of origins.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let raw = raw.trim();
    let origins: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str(raw).map_err(|_| ConfigError::Invalid {
            key: "CORS_ORIGINS",
            value: raw.to_string(),
            expected: "a JSON array of strings",
        })?
    } else {
        raw.split(',').map(str::to_string).collect()
    };

    Ok(origins
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect())
}
