use crate::errors::TelegramError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Extra time on top of the long-poll wait before the request itself gives up.
const POLL_GRACE: Duration = Duration::from_secs(5);
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

/// Minimal Telegram Bot API client: `sendMessage` and long-poll `getUpdates`.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    fn method_url(&self, method: &str) -> Result<String, TelegramError> {
        let token = self.token.as_deref().ok_or(TelegramError::Disabled)?;
        Ok(format!("{}/bot{token}/{method}", self.base_url))
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let response = self
            .client
            .post(self.method_url("sendMessage")?)
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
            })
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }

    /// Waits up to `wait` for updates with an id of at least `offset`.
    pub async fn get_updates(&self, offset: i64, wait: Duration) -> Result<Vec<Update>, TelegramError> {
        let response = self
            .client
            .get(self.method_url("getUpdates")?)
            .query(&[("offset", offset), ("timeout", wait.as_secs() as i64)])
            .timeout(wait + POLL_GRACE)
            .send()
            .await?;
        decode::<Vec<Update>>(response)
            .await
            .map(Option::unwrap_or_default)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>, TelegramError> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;
    match serde_json::from_slice::<ApiResponse<T>>(&bytes) {
        Ok(body) if body.ok => Ok(body.result),
        Ok(ApiResponse {
            error_code: Some(code),
            description,
            ..
        }) => Err(TelegramError::Api {
            code,
            description: description.unwrap_or_default(),
        }),
        Ok(body) => Err(TelegramError::Unreadable {
            status,
            detail: body.description.unwrap_or_default(),
        }),
        Err(err) => Err(TelegramError::Unreadable {
            status,
            detail: format!("unreadable response: {err}"),
        }),
    }
}
