//! Chat session runtime
//!
//! Owns the conversation and executes the effects of the pure transition
//! function. The state check and the transition happen under one lock, so
//! two concurrent submits can never both be accepted. The lock is never
//! held across the transport call.

use super::state::{FailureKind, SessionError};
use super::transition::{transition, TransitionError, TransitionResult};
use super::{Effect, Event, SessionEvent, SessionState};
use crate::config::DEFAULT_SEND_TIMEOUT;
use crate::conversation::{ChatMessage, Conversation, Message};
use crate::locale::{suggested_questions, LocaleStore};
use crate::transport::Transport;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// How a send finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    Failed(SessionError),
}

struct Inner {
    state: SessionState,
    conversation: Conversation,
    pending_input: String,
    /// Token for the send in flight, if any
    cancel: Option<CancellationToken>,
}

pub struct ChatSession<T: Transport> {
    inner: Arc<Mutex<Inner>>,
    transport: Arc<T>,
    locale: Arc<LocaleStore>,
    send_timeout: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl<T: Transport> Clone for ChatSession<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            transport: Arc::clone(&self.transport),
            locale: Arc::clone(&self.locale),
            send_timeout: self.send_timeout,
            events: self.events.clone(),
        }
    }
}

impl<T: Transport + 'static> ChatSession<T> {
    pub fn new(transport: T, locale: Arc<LocaleStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Idle,
                conversation: Conversation::new(),
                pending_input: String::new(),
                cancel: None,
            })),
            transport: Arc::new(transport),
            locale,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            events,
        }
    }

    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Snapshot of the conversation
    pub fn conversation(&self) -> Conversation {
        self.lock().conversation.clone()
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.lock().state.error().cloned()
    }

    pub fn pending_input(&self) -> String {
        self.lock().pending_input.clone()
    }

    pub fn set_input(&self, input: impl Into<String>) {
        self.lock().pending_input = input.into();
    }

    pub fn locale(&self) -> &Arc<LocaleStore> {
        &self.locale
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Example questions for the current locale, offered only while the
    /// conversation is empty
    pub fn suggested_prompts(&self) -> &'static [&'static str] {
        if self.lock().conversation.is_empty() {
            suggested_questions(self.locale.get())
        } else {
            &[]
        }
    }

    /// Copy suggestion `index` into the pending input. Does not submit.
    pub fn select_suggestion(&self, index: usize) -> Option<&'static str> {
        let prompt = self.suggested_prompts().get(index).copied()?;
        self.set_input(prompt);
        Some(prompt)
    }

    /// Submit the pending input
    pub async fn submit_input(&self) -> Result<SendOutcome, TransitionError> {
        let input = self.pending_input();
        self.submit(&input).await
    }

    /// Append `text` as a user message and send the conversation.
    ///
    /// The message is stored as typed; only the emptiness check trims.
    /// Rejections (`EmptyInput`, `Busy`) leave everything unchanged. Once
    /// accepted, the call waits for the send to finish; its failure is
    /// reported as [`SendOutcome::Failed`] and through [`Self::last_error`].
    ///
    /// The send runs in its own task. Dropping this future does not abort
    /// it: the session still leaves `Sending` when the reply arrives, the
    /// send fails, or the send timeout expires.
    pub async fn submit(&self, text: &str) -> Result<SendOutcome, TransitionError> {
        let (messages, cancel) = {
            let mut inner = self.lock();
            let result = transition(
                &inner.state,
                Event::Submit {
                    text: text.to_string(),
                },
            )?;
            let cancel = CancellationToken::new();
            inner.cancel = Some(cancel.clone());
            let messages = self.apply(&mut inner, result);
            (messages, cancel)
        };

        let Some(messages) = messages else {
            return Err(TransitionError::InvalidTransition(
                "submit accepted without a send".to_string(),
            ));
        };

        let session = self.clone();
        let send = tokio::spawn(async move { session.complete_send(&messages, cancel).await });

        match send.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Send task failed");
                self.finish(Event::SendFailed {
                    error: SessionError::new(FailureKind::Transport, e.to_string()),
                })
            }
        }
    }

    /// Abort the send in flight. Returns false when nothing is being sent.
    pub fn cancel(&self) -> bool {
        match &self.lock().cancel {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Perform the transport call and apply its outcome
    async fn complete_send(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<SendOutcome, TransitionError> {
        let event = match self.dispatch(messages, cancel).await {
            Ok(text) => Event::ReplyReceived { text },
            Err(error) => {
                tracing::warn!(
                    kind = error.kind.as_str(),
                    detail = %error.detail,
                    "Send failed"
                );
                Event::SendFailed { error }
            }
        };
        self.finish(event)
    }

    /// Leave `Sending` with the outcome of the send
    fn finish(&self, event: Event) -> Result<SendOutcome, TransitionError> {
        let outcome = match &event {
            Event::SendFailed { error } => SendOutcome::Failed(error.clone()),
            _ => SendOutcome::Replied,
        };

        let mut inner = self.lock();
        inner.cancel = None;
        let result = transition(&inner.state, event)?;
        self.apply(&mut inner, result);
        Ok(outcome)
    }

    /// One transport call bounded by the send timeout
    async fn dispatch(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<String, SessionError> {
        let send = self.transport.send(messages, cancel.clone());
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SessionError::cancelled()),
            result = tokio::time::timeout(self.send_timeout, send) => match result {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => Err(SessionError::from(&e)),
                Err(_) => {
                    cancel.cancel();
                    Err(SessionError::timeout())
                }
            },
        }
    }

    /// Execute effects under the lock. Returns the conversation to send if
    /// a send was requested.
    fn apply(&self, inner: &mut Inner, result: TransitionResult) -> Option<Vec<ChatMessage>> {
        let mut to_send = None;

        for effect in result.effects {
            match effect {
                Effect::AppendMessage { role, content } => {
                    let message = inner.conversation.push(Message::new(role, content)).clone();
                    let _ = self.events.send(SessionEvent::MessageAppended { message });
                }
                Effect::ClearInput => inner.pending_input.clear(),
                Effect::SendConversation => to_send = Some(inner.conversation.to_wire()),
            }
        }

        if inner.state != result.new_state {
            tracing::debug!(
                from = inner.state.name(),
                to = result.new_state.name(),
                "Session state change"
            );
            inner.state = result.new_state;
            let _ = self.events.send(SessionEvent::StateChanged {
                state: inner.state.clone(),
            });
        }

        to_send
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
