use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::{FirefliesConfig, BATCH_SIZE, DELETE_TRANSCRIPT_MUTATION, TRANSCRIPTS_QUERY};
use crate::models::{DeleteTranscriptData, GraphQLResponse, Transcript, TranscriptsData};

#[derive(Debug, Error)]
pub enum FirefliesError {
    #[error("Authentication failed ({status}): {body}. Check your Fireflies API token.")]
    Unauthorized { status: StatusCode, body: String },
    #[error("Fireflies API returned HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("Request to Fireflies timed out")]
    Timeout,
    #[error("Failed to send GraphQL request to Fireflies: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Failed to parse Fireflies GraphQL response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("GraphQL errors: {0}")]
    GraphQL(String),
    #[error("Fireflies response contained no data")]
    MissingData,
}

impl From<reqwest::Error> for FirefliesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FirefliesError::Timeout
        } else {
            FirefliesError::Transport(err)
        }
    }
}

/// Remote delete operation used by the delete engine.
#[async_trait]
pub trait TranscriptDeleter: Send + Sync {
    async fn delete_transcript(&self, transcript_id: &str) -> Result<(), FirefliesError>;
}

pub struct FirefliesClient {
    client: Client,
    graphql_url: String,
    api_token: String,
}

impl FirefliesClient {
    pub fn new(config: &FirefliesConfig) -> Result<Self, FirefliesError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(FirefliesError::Transport)?;

        Ok(Self {
            client,
            graphql_url: config.graphql_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    async fn execute<T: DeserializeOwned>(&self, body: &Value) -> Result<T, FirefliesError> {
        let response = self
            .client
            .post(&self.graphql_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(FirefliesError::Unauthorized { status, body });
            }
            return Err(FirefliesError::Http { status, body });
        }

        let text = response.text().await?;
        let gql_response: GraphQLResponse<T> = serde_json::from_str(&text)?;

        if let Some(messages) = gql_response.error_messages() {
            return Err(FirefliesError::GraphQL(messages));
        }

        gql_response.data.ok_or(FirefliesError::MissingData)
    }

    pub async fn query_transcripts(
        &self,
        limit: i32,
        skip: i32,
    ) -> Result<Vec<Transcript>, FirefliesError> {
        let body = json!({
            "query": TRANSCRIPTS_QUERY,
            "variables": {
                "limit": limit,
                "skip": skip,
            },
        });

        let data: TranscriptsData = self.execute(&body).await?;
        Ok(data.transcripts)
    }

    pub async fn fetch_all_transcripts(&self) -> Result<Vec<Transcript>, FirefliesError> {
        let mut all_transcripts = Vec::new();
        let mut skip = 0;

        loop {
            debug!(
                "Fetching transcripts batch: skip={}, limit={}",
                skip, BATCH_SIZE
            );

            let batch = match self.query_transcripts(BATCH_SIZE, skip).await {
                Ok(b) => b,
                Err(e) => {
                    debug!(
                        "Batch at skip={} failed, discarding {} transcripts collected so far",
                        skip,
                        all_transcripts.len()
                    );
                    return Err(e);
                }
            };

            let batch_size = batch.len();
            debug!("Received {} transcripts in batch", batch_size);
            all_transcripts.extend(batch);

            if (batch_size as i32) < BATCH_SIZE {
                break;
            }

            skip += BATCH_SIZE;
        }

        Ok(all_transcripts)
    }
}

#[async_trait]
impl TranscriptDeleter for FirefliesClient {
    async fn delete_transcript(&self, transcript_id: &str) -> Result<(), FirefliesError> {
        let body = json!({
            "query": DELETE_TRANSCRIPT_MUTATION,
            "variables": { "id": transcript_id },
        });

        let data: DeleteTranscriptData = self.execute(&body).await?;
        match data.delete_transcript {
            Some(deleted) => {
                debug!(
                    "Fireflies confirmed deletion of {}",
                    deleted.id.as_deref().unwrap_or(transcript_id)
                );
                Ok(())
            }
            None => Err(FirefliesError::MissingData),
        }
    }
}
