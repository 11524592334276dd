use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Absent key disables the text model; AI endpoints then serve fallbacks.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub ai_rate_limit_per_hour: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            llm_model: optional_env("LLM_MODEL")
                .unwrap_or_else(|| crate::llm_client::DEFAULT_MODEL.to_string()),
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_ttl_hours: parse_env("JWT_TTL_HOURS", 168)?,
            ai_rate_limit_per_hour: parse_env("AI_RATE_LIMIT_PER_HOUR", 20)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u16 = parse_env("CRAFTCONNECT_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CRAFTCONNECT_TEST_BAD_LIMIT", "twenty");
        let result: Result<u32> = parse_env("CRAFTCONNECT_TEST_BAD_LIMIT", 20);
        assert!(result.is_err());
        std::env::remove_var("CRAFTCONNECT_TEST_BAD_LIMIT");
    }

    #[test]
    fn test_optional_env_treats_blank_as_absent() {
        std::env::set_var("CRAFTCONNECT_TEST_BLANK_KEY", "   ");
        assert!(optional_env("CRAFTCONNECT_TEST_BLANK_KEY").is_none());
        std::env::remove_var("CRAFTCONNECT_TEST_BLANK_KEY");
    }
}
