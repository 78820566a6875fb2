//! Telegram Bot API client over `reqwest`.

use super::mapper::{Envelope, Incoming, map_update, model_keyboard};
use super::types::{ApiResponse, BotCommandSpec, File, InlineKeyboardMarkup, Update};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use vocalis_core::config::TelegramSettings;
use vocalis_core::error::{Result, VocalisError};
use vocalis_core::event::{BotCommand, InboundEvent};
use vocalis_core::model::RemoteFileRef;
use vocalis_core::reply::{Reply, VoiceNote};

/// Extra time granted to `getUpdates` on top of the long-poll timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Timeout for every call other than `getUpdates`.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

const VOICE_FILE_NAME: &str = "voice.ogg";

/// Thin Bot API client. Every method maps to one API call.
///
/// The token is part of every URL, so request errors are reported without
/// their URL.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    /// `<api_url>/bot<token>`
    base_url: String,
    poll_timeout: Duration,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct GetFile<'a> {
    file_id: &'a str,
}

#[derive(Serialize)]
struct SetMyCommands {
    commands: Vec<BotCommandSpec>,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
}

impl TelegramClient {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: &TelegramSettings, http: Client) -> Self {
        Self {
            http,
            base_url: format!(
                "{}/bot{}",
                settings.api_url.trim_end_matches('/'),
                settings.token
            ),
            poll_timeout: settings.poll_timeout,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Calls `method` with a JSON body.
    async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;
        Self::parse_response(method, response).await
    }

    async fn parse_response<R: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<R> {
        let status = response.status();
        let body: ApiResponse<R> = response.json().await.map_err(|e| {
            VocalisError::Transport(format!(
                "{} returned unreadable body ({}): {}",
                method,
                status,
                e.without_url()
            ))
        })?;

        match body {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(VocalisError::Transport(format!(
                "{} failed ({}): {}",
                method,
                error_code.map_or_else(|| status.to_string(), |c| c.to_string()),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &params, self.poll_timeout + POLL_GRACE)
            .await
    }

    /// Long-polls and maps the batch. Returns the envelopes and the offset to
    /// pass to the next poll.
    pub async fn poll(&self, offset: Option<i64>) -> Result<(Vec<Envelope>, Option<i64>)> {
        let updates = self.get_updates(offset).await?;
        let next_offset = updates
            .iter()
            .map(|u| u.update_id + 1)
            .max()
            .or(offset);
        let envelopes = updates.into_iter().filter_map(map_update).collect();
        Ok((envelopes, next_offset))
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let params = SendMessage {
            chat_id,
            text,
            reply_markup,
        };
        let _: serde_json::Value = self.call("sendMessage", &params, CALL_TIMEOUT).await?;
        Ok(())
    }

    /// Uploads an Ogg/Opus voice note.
    pub async fn send_voice(&self, chat_id: i64, voice: &VoiceNote) -> Result<()> {
        let part = Part::bytes(voice.audio.clone())
            .file_name(VOICE_FILE_NAME)
            .mime_str(voice.mime_type)
            .map_err(|e| VocalisError::internal(format!("invalid voice MIME type: {}", e)))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("duration", voice.duration_seconds.to_string())
            .part("voice", part);

        let response = self
            .http
            .post(self.method_url("sendVoice"))
            .multipart(form)
            .timeout(CALL_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error("sendVoice", e))?;
        let _: serde_json::Value = Self::parse_response("sendVoice", response).await?;
        debug!(
            chat_id,
            bytes = voice.audio.len(),
            duration = voice.duration_seconds,
            "Sent voice note"
        );
        Ok(())
    }

    /// Delivers a [`Reply`] to `chat_id`.
    pub async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Text(text) => self.send_message(chat_id, text, None).await,
            Reply::Voice(voice) => self.send_voice(chat_id, voice).await,
            Reply::ModelMenu { prompt, models } => {
                self.send_message(chat_id, prompt, Some(model_keyboard(models)))
                    .await
            }
        }
    }

    /// Resolves a `file_id` to the path used by the file endpoint.
    pub async fn get_file(&self, file_id: &str) -> Result<RemoteFileRef> {
        let file: File = self
            .call("getFile", &GetFile { file_id }, CALL_TIMEOUT)
            .await?;
        file.file_path.map(RemoteFileRef::new).ok_or_else(|| {
            VocalisError::download(format!("file {} has no downloadable path", file.file_id))
        })
    }

    /// Turns an [`Incoming`] into an orchestrator event, resolving voice
    /// uploads through `getFile`.
    pub async fn resolve(&self, incoming: Incoming) -> Result<InboundEvent> {
        match incoming {
            Incoming::Event(event) => Ok(event),
            Incoming::Voice { user_id, file_id } => Ok(InboundEvent::Voice {
                user_id,
                file_ref: self.get_file(&file_id).await?,
            }),
        }
    }

    /// Registers the command menu.
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<()> {
        let params = SetMyCommands {
            commands: command_specs(commands),
        };
        let _: bool = self.call("setMyCommands", &params, CALL_TIMEOUT).await?;
        Ok(())
    }

    /// Stops the client-side spinner on an inline button.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let params = AnswerCallbackQuery { callback_query_id };
        let acknowledged: bool = self
            .call("answerCallbackQuery", &params, CALL_TIMEOUT)
            .await?;
        if !acknowledged {
            warn!(callback_query_id, "Callback query not acknowledged");
        }
        Ok(())
    }
}

fn command_specs(commands: &[BotCommand]) -> Vec<BotCommandSpec> {
    commands
        .iter()
        .map(|command| BotCommandSpec {
            command: command.to_string(),
            description: command.description().to_string(),
        })
        .collect()
}

fn transport_error(method: &str, e: reqwest::Error) -> VocalisError {
    VocalisError::Transport(format!("{} request failed: {}", method, e.without_url()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use vocalis_core::UserId;

    const TOKEN: &str = "123:secret";

    struct RecordedCall {
        method: String,
        content_type: String,
        body: Bytes,
    }

    // Mock Bot API: canned response per method, records every call.
    #[derive(Default)]
    struct MockBotApi {
        responses: HashMap<String, Value>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockBotApi {
        fn with(mut self, method: &str, response: Value) -> Self {
            self.responses.insert(method.to_string(), response);
            self
        }

        fn calls_to(&self, method: &str) -> Vec<(String, Bytes)> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.method == method)
                .map(|c| (c.content_type.clone(), c.body.clone()))
                .collect()
        }
    }

    async fn handle(
        State(api): State<Arc<MockBotApi>>,
        Path((bot, method)): Path<(String, String)>,
        headers: HeaderMap,
        body: Bytes,
    ) -> axum::Json<Value> {
        if bot != format!("bot{TOKEN}") {
            return axum::Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"}));
        }
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        api.calls.lock().unwrap().push(RecordedCall {
            method: method.clone(),
            content_type,
            body,
        });
        axum::Json(
            api.responses
                .get(&method)
                .cloned()
                .unwrap_or_else(|| json!({"ok": false, "error_code": 404, "description": "Not Found"})),
        )
    }

    async fn spawn_client(api: MockBotApi) -> (TelegramClient, Arc<MockBotApi>) {
        let api = Arc::new(api);
        let app = Router::new()
            .route("/:bot/:method", post(handle))
            .with_state(api.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let settings = TelegramSettings {
            token: TOKEN.to_string(),
            api_url: format!("http://{addr}/"),
            poll_timeout: Duration::from_secs(1),
        };
        (TelegramClient::new(&settings), api)
    }

    fn json_body(body: &Bytes) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_poll_maps_updates_and_advances_offset() {
        let api = MockBotApi::default().with(
            "getUpdates",
            json!({"ok": true, "result": [
                {"update_id": 10, "message": {
                    "message_id": 1, "from": {"id": 5}, "chat": {"id": 50}, "text": "hi"}},
                {"update_id": 11}
            ]}),
        );
        let (client, api) = spawn_client(api).await;

        let (envelopes, offset) = client.poll(Some(10)).await.unwrap();

        assert_eq!(offset, Some(12));
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].incoming.user_id(), UserId(5));

        let calls = api.calls_to("getUpdates");
        let sent = json_body(&calls[0].1);
        assert_eq!(sent["offset"], 10);
        assert_eq!(sent["timeout"], 1);
    }

    #[tokio::test]
    async fn test_empty_poll_keeps_offset() {
        let api = MockBotApi::default().with("getUpdates", json!({"ok": true, "result": []}));
        let (client, _api) = spawn_client(api).await;

        let (envelopes, offset) = client.poll(Some(3)).await.unwrap();
        assert!(envelopes.is_empty());
        assert_eq!(offset, Some(3));
    }

    #[tokio::test]
    async fn test_model_menu_is_sent_with_keyboard() {
        let api = MockBotApi::default().with("sendMessage", json!({"ok": true, "result": {}}));
        let (client, api) = spawn_client(api).await;

        let reply = Reply::ModelMenu {
            prompt: "Pick one".to_string(),
            models: vec!["alice".to_string()],
        };
        client.send_reply(77, &reply).await.unwrap();

        let sent = json_body(&api.calls_to("sendMessage")[0].1);
        assert_eq!(sent["chat_id"], 77);
        assert_eq!(sent["text"], "Pick one");
        assert_eq!(
            sent["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "choose_model|alice"
        );
    }

    #[tokio::test]
    async fn test_plain_text_has_no_markup() {
        let api = MockBotApi::default().with("sendMessage", json!({"ok": true, "result": {}}));
        let (client, api) = spawn_client(api).await;

        client.send_reply(1, &Reply::text("hello")).await.unwrap();

        let sent = json_body(&api.calls_to("sendMessage")[0].1);
        assert!(sent.get("reply_markup").is_none());
    }

    #[tokio::test]
    async fn test_send_voice_is_multipart() {
        let api = MockBotApi::default().with("sendVoice", json!({"ok": true, "result": {}}));
        let (client, api) = spawn_client(api).await;

        let voice = VoiceNote {
            audio: b"OggS-opus-bytes".to_vec(),
            mime_type: "audio/ogg",
            duration_seconds: 4,
        };
        client.send_reply(9, &Reply::Voice(voice)).await.unwrap();

        let (content_type, body) = api.calls_to("sendVoice").remove(0);
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&body).to_lowercase();
        assert!(body.contains("name=\"duration\""));
        assert!(body.contains("content-type: audio/ogg"));
        assert!(body.contains("filename=\"voice.ogg\""));
        assert!(body.contains("oggs-opus-bytes"));
    }

    #[tokio::test]
    async fn test_get_file_and_resolve() {
        let api = MockBotApi::default().with(
            "getFile",
            json!({"ok": true, "result": {"file_id": "abc", "file_path": "voice/file_3.oga"}}),
        );
        let (client, _api) = spawn_client(api).await;

        let event = client
            .resolve(Incoming::Voice {
                user_id: UserId(1),
                file_id: "abc".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            event,
            InboundEvent::Voice {
                user_id: UserId(1),
                file_ref: RemoteFileRef::new("voice/file_3.oga"),
            }
        );
    }

    #[tokio::test]
    async fn test_get_file_without_path() {
        let api = MockBotApi::default().with(
            "getFile",
            json!({"ok": true, "result": {"file_id": "abc"}}),
        );
        let (client, _api) = spawn_client(api).await;

        assert!(matches!(
            client.get_file("abc").await,
            Err(VocalisError::Download(_))
        ));
    }

    #[tokio::test]
    async fn test_api_error_hides_token() {
        let (client, _api) = spawn_client(MockBotApi::default()).await;

        let err = client.send_message(1, "hi", None).await.unwrap_err();

        assert!(matches!(err, VocalisError::Transport(ref m) if m.contains("Not Found")));
        assert!(!err.to_string().contains(TOKEN));
    }

    #[tokio::test]
    async fn test_set_my_commands() {
        let api = MockBotApi::default().with("setMyCommands", json!({"ok": true, "result": true}));
        let (client, api) = spawn_client(api).await;

        client
            .set_my_commands(&[BotCommand::Start, BotCommand::SaveModel])
            .await
            .unwrap();

        let sent = json_body(&api.calls_to("setMyCommands")[0].1);
        assert_eq!(sent["commands"][0]["command"], "start");
        assert_eq!(sent["commands"][1]["command"], "save_model");
    }
}
