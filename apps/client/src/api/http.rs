use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{decode_game_state, ErrorBody, NewGameResponse, ServerInfo};
use super::{GameApi, OP_CREATE_GAME, OP_FETCH_STATE, OP_SERVER_INFO, OP_SUBMIT_ACTIONS};
use crate::config::ClientConfig;
use crate::domain::{ActionSubmission, GameId, GameState};
use crate::error::ClientError;

const MAX_DETAIL_LEN: usize = 200;

/// Game client speaking JSON over HTTP.
///
/// Holds no game state of its own; the game id is passed into every call.
/// `GET /new` creates a game, `GET /game/{id}` reads it and
/// `POST /game/{id}` with a form body submits actions.
#[derive(Debug, Clone)]
pub struct HttpGameClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl HttpGameClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let base_url = config.base_url()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Read the server's index document.
    pub async fn server_info(&self) -> Result<ServerInfo, ClientError> {
        let url = self.endpoint(OP_SERVER_INFO, "")?;
        let body = self.round_trip(OP_SERVER_INFO, self.http.get(url)).await?;
        decode_json(OP_SERVER_INFO, &body)
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> Result<Url, ClientError> {
        self.base_url.join(path).map_err(|e| {
            ClientError::config(format!("cannot build {operation} URL from '{path}': {e}"))
        })
    }

    fn game_endpoint(&self, operation: &'static str, id: GameId) -> Result<Url, ClientError> {
        self.endpoint(operation, &format!("game/{id}"))
    }

    /// Perform one request and return the body of a successful response.
    async fn round_trip(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(operation, &e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(operation, &e))?;

        debug!(operation, status, bytes = body.len(), "game server responded");

        if !self.config.is_success(status) {
            return Err(ClientError::protocol(
                operation,
                status,
                server_detail(&body),
            ));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl GameApi for HttpGameClient {
    async fn create_game(&self) -> Result<GameId, ClientError> {
        let url = self.endpoint(OP_CREATE_GAME, "new")?;
        let body = self.round_trip(OP_CREATE_GAME, self.http.get(url)).await?;
        let created: NewGameResponse = decode_json(OP_CREATE_GAME, &body)?;
        debug!(game_id = %created.id, location = ?created.location, "game created");
        Ok(created.id)
    }

    async fn fetch_state(&self, id: GameId) -> Result<GameState, ClientError> {
        let url = self.game_endpoint(OP_FETCH_STATE, id)?;
        let body = self.round_trip(OP_FETCH_STATE, self.http.get(url)).await?;
        decode_game_state(&body)
    }

    async fn submit_actions(
        &self,
        id: GameId,
        actions: &ActionSubmission,
    ) -> Result<(), ClientError> {
        let url = self.game_endpoint(OP_SUBMIT_ACTIONS, id)?;
        let request = self.http.post(url).form(&actions.form_pairs());
        // Response body is not part of the contract.
        self.round_trip(OP_SUBMIT_ACTIONS, request).await?;
        Ok(())
    }
}

fn decode_json<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::decode(operation, e.to_string()))
}

/// Best-effort description of a failed response: the server's `error`
/// field when the body is an error document, otherwise the raw text.
fn server_detail(body: &[u8]) -> Option<String> {
    if let Ok(error) = serde_json::from_slice::<ErrorBody>(body) {
        return Some(error.error);
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_DETAIL_LEN).collect())
}
