use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const FIREFLIES_GRAPHQL_URL: &str = "https://api.fireflies.ai/graphql";
pub const BATCH_SIZE: i32 = 50;
pub const DEFAULT_OUTPUT_DIR: &str = "transcripts";
pub const DEFAULT_DELETE_CONCURRENCY: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const TRANSCRIPTS_QUERY: &str = r#"
query GetTranscripts($limit: Int!, $skip: Int!) {
  transcripts(limit: $limit, skip: $skip) {
    id
    title
    date
    sentences {
      index
      text
      raw_text
      start_time
      end_time
      speaker_id
      speaker_name
    }
    host_email
    organizer_email
    user {
      user_id
      email
      name
      num_transcripts
      recent_transcript
      minutes_consumed
      is_admin
      integrations
    }
    fireflies_users
    participants
    transcript_url
    audio_url
    duration
  }
}
"#;

pub const DELETE_TRANSCRIPT_MUTATION: &str = r#"
mutation deleteTranscript($id: String!) {
  deleteTranscript(id: $id) {
    id
  }
}
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing API token: set FIREFLIES_AI_API_TOKEN (or API_TOKEN)")]
    MissingApiToken,
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct FirefliesConfig {
    pub api_token: String,
    pub graphql_url: String,
    pub output_dir: PathBuf,
    pub delete_concurrency: usize,
    pub request_timeout: Duration,
    pub include_id_in_filename: bool,
}

impl FirefliesConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            graphql_url: FIREFLIES_GRAPHQL_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            include_id_in_filename: true,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = ["FIREFLIES_AI_API_TOKEN", "API_TOKEN"]
            .iter()
            .filter_map(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiToken)?;

        let mut config = Self::new(api_token);

        if let Some(url) = lookup("FIREFLIES_GRAPHQL_URL").filter(|v| !v.trim().is_empty()) {
            config.graphql_url = url.trim().to_string();
        }

        if let Some(dir) = lookup("OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            config.output_dir = PathBuf::from(dir.trim());
        }

        if let Some(raw) = lookup("DELETE_CONCURRENCY") {
            config.delete_concurrency = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DELETE_CONCURRENCY",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "REQUEST_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup("INCLUDE_ID_IN_FILENAME") {
            config.include_id_in_filename = match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "INCLUDE_ID_IN_FILENAME",
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}
