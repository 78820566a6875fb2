//! Long-poll loop that fans updates out to per-event tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use vocalis_application::{SessionUseCase, messages};
use vocalis_core::error::VocalisError;
use vocalis_core::reply::Reply;
use vocalis_interaction::{Envelope, TelegramClient};

/// Pause after a failed poll before trying again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Polls the Bot API and runs one task per update.
///
/// Ordering between events of the same user is enforced by the session
/// lock inside [`SessionUseCase`], not here.
pub struct Dispatcher {
    telegram: TelegramClient,
    usecase: Arc<SessionUseCase>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl Dispatcher {
    pub fn new(
        telegram: TelegramClient,
        usecase: Arc<SessionUseCase>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            telegram,
            usecase,
            shutdown,
            tasks: TaskTracker::new(),
        }
    }

    /// Runs until the shutdown token fires, then waits for in-flight events
    /// to send their replies.
    pub async fn run(&self) {
        let mut offset = None;
        info!("Polling for updates");

        loop {
            let polled = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                polled = self.telegram.poll(offset) => polled,
            };

            match polled {
                Ok((envelopes, next_offset)) => {
                    offset = next_offset;
                    for envelope in envelopes {
                        self.spawn(envelope);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Polling failed, retrying");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }

        self.tasks.close();
        info!(in_flight = self.tasks.len(), "Shutting down");
        self.tasks.wait().await;
    }

    fn spawn(&self, envelope: Envelope) {
        let telegram = self.telegram.clone();
        let usecase = self.usecase.clone();
        let shutdown = self.shutdown.clone();
        self.tasks.spawn(async move {
            dispatch(&telegram, &usecase, &shutdown, envelope).await;
        });
    }
}

/// Handles one update end to end and sends exactly one reply.
///
/// If `shutdown` fires first the handler is dropped and the user gets the
/// generic failure text.
pub async fn dispatch(
    telegram: &TelegramClient,
    usecase: &SessionUseCase,
    shutdown: &CancellationToken,
    envelope: Envelope,
) {
    let Envelope {
        update_id,
        chat_id,
        callback_query_id,
        incoming,
    } = envelope;
    let user_id = incoming.user_id();

    if let Some(id) = callback_query_id {
        if let Err(e) = telegram.answer_callback_query(&id).await {
            warn!(update_id, error = %e, "Failed to answer callback query");
        }
    }

    let reply = match telegram.resolve(incoming).await {
        Ok(event) => {
            debug!(update_id, user_id = %user_id, kind = event.kind(), "Dispatching event");
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    let e = VocalisError::Cancelled;
                    warn!(update_id, user_id = %user_id, error = %e, "Event dropped by shutdown");
                    Reply::Text(messages::error_text(&e))
                }
                reply = usecase.handle(event) => reply,
            }
        }
        Err(e) => {
            warn!(update_id, user_id = %user_id, error = %e, "Could not resolve update");
            Reply::Text(messages::error_text(&e))
        }
    };

    if let Err(e) = telegram.send_reply(chat_id, &reply).await {
        warn!(update_id, chat_id, error = %e, "Failed to deliver reply");
    }
}
