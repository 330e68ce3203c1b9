//! Hosted backend reached over HTTP RPC.
//!
//! Talks to a PostgREST-style endpoint: each procedure is a `POST` to
//! `{url}/rest/v1/rpc/{name}` with the arguments as a JSON object.

use crate::config::BackendConfig;
use crate::core::Message;
use crate::error::{Error, Result};
use crate::storage::traits::{ConversationStore, StoredConversation};
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use std::time::Duration;

const GET_RECENT_CONVERSATION: &str = "get_recent_conversation";
const SAVE_CHAT_CONVERSATION: &str = "save_chat_conversation";

/// RPC client for the hosted conversation store.
#[derive(Debug)]
pub struct RemoteBackend {
    client: Client,
    rpc_base: String,
    api_key: String,
    bearer: String,
}

#[derive(Serialize)]
struct GetRecentArgs<'a> {
    user_id_input: &'a str,
}

#[derive(Serialize)]
struct SaveArgs<'a> {
    user_id_input: &'a str,
    messages_input: &'a [Message],
    last_message_input: &'a str,
}

impl RemoteBackend {
    /// Build a client from backend configuration.
    ///
    /// The access token is sent as the bearer credential when present;
    /// otherwise the API key is used, as anonymous clients do.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or API key is missing, or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(Error::Config(
                "backend.url is required for the remote backend".to_string(),
            ));
        }
        if config.api_key.is_empty() {
            return Err(Error::Config(
                "backend.api_key is required for the remote backend".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("mirrormind/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let bearer = config
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| config.api_key.clone());

        Ok(Self {
            client,
            rpc_base: rpc_base(&config.url),
            api_key: config.api_key.clone(),
            bearer,
        })
    }

    /// Full URL for a procedure.
    #[must_use]
    pub fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/{procedure}", self.rpc_base)
    }

    fn call<A: Serialize>(&self, procedure: &str, args: &A) -> Result<Response> {
        let url = self.rpc_url(procedure);
        tracing::debug!(%url, "calling backend procedure");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
            .json(args)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(Error::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

impl ConversationStore for RemoteBackend {
    fn get_recent_conversation(&self, user_id: &str) -> Result<Vec<StoredConversation>> {
        let response = self.call(
            GET_RECENT_CONVERSATION,
            &GetRecentArgs {
                user_id_input: user_id,
            },
        )?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn save_chat_conversation(
        &self,
        user_id: &str,
        messages: &[Message],
        last_message: &str,
    ) -> Result<()> {
        // void procedure: body is empty or `null`
        self.call(
            SAVE_CHAT_CONVERSATION,
            &SaveArgs {
                user_id_input: user_id,
                messages_input: messages,
                last_message_input: last_message,
            },
        )?;
        Ok(())
    }
}

fn rpc_base(url: &str) -> String {
    format!("{}/rest/v1/rpc", url.trim_end_matches('/'))
}
