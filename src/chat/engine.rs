//! Conversation engine — scripted branching dialog with a free-text
//! fallback classifier.
//!
//! Option clicks are answered synchronously. Free text gets its reply after
//! a simulated "thinking" delay through a single pending-reply slot: any new
//! input first delivers the pending reply, so the transcript always reflects
//! the order in which exchanges were started.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::classifier;
use super::model::{Message, Transcript};
use super::responses::{self, GREETING, SideEffect, UNRECOGNIZED};
use crate::timer::ScopedTimer;

/// Default scheduling page opened by the `open-calendly` branch.
pub const DEFAULT_SCHEDULER_URL: &str = "https://calendly.com/structuredpartners/strategy-call";

/// Engine settings.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub reply_delay: Duration,
    pub scheduler_url: String,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            scheduler_url: DEFAULT_SCHEDULER_URL.to_string(),
        }
    }
}

/// Work the client must perform outside the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Open `url` in a new tab. Not de-duplicated: selecting the branch
    /// twice asks for two tabs.
    OpenExternal { url: String },
}

#[derive(Debug)]
struct PendingReply {
    ticket: u64,
    message: Message,
}

/// One visitor's dialog state.
#[derive(Debug)]
pub struct Conversation {
    transcript: Transcript,
    pending: Option<PendingReply>,
    next_ticket: u64,
    settings: ConversationSettings,
}

impl Conversation {
    /// Start a conversation with the greeting menu.
    pub fn new(settings: ConversationSettings) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(GREETING.to_message());
        Self {
            transcript,
            pending: None,
            next_ticket: 0,
            settings,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    /// Whether a free-text reply is still "thinking".
    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    /// Visitor clicked an option.
    ///
    /// Appends the echoed label and exactly one assistant reply: the table
    /// entry, or the unrecognized-branch menu. The `open-calendly` branch
    /// additionally returns an [`Effect::OpenExternal`]; every other branch
    /// is a pure state transition.
    pub fn select_option(&mut self, action: &str) -> Vec<Effect> {
        self.flush_pending();

        let echo = self
            .transcript
            .option_label(action)
            .unwrap_or(action)
            .to_string();
        self.transcript.push(Message::visitor(echo));

        let mut effects = Vec::new();
        match responses::lookup(action) {
            Some(reply) => {
                self.transcript.push(reply.to_message());
                if let Some(SideEffect::OpenScheduler) = reply.effect {
                    info!(url = %self.settings.scheduler_url, "Chat opening scheduler");
                    effects.push(Effect::OpenExternal {
                        url: self.settings.scheduler_url.clone(),
                    });
                }
            }
            None => {
                debug!(action, "Unrecognized chat action, offering menu");
                self.transcript.push(UNRECOGNIZED.to_message());
            }
        }
        effects
    }

    /// Visitor typed a message.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the text is
    /// appended verbatim and the classified reply is parked in the pending
    /// slot; the returned ticket identifies it for [`Self::deliver_pending`].
    pub fn submit_free_text(&mut self, text: &str) -> Option<u64> {
        if text.trim().is_empty() {
            return None;
        }
        self.flush_pending();

        self.transcript.push(Message::visitor(text));
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(PendingReply {
            ticket,
            message: classifier::reply_for(text).to_message(),
        });
        Some(ticket)
    }

    /// Deliver the reply for `ticket` if it is still pending. A ticket that
    /// was already flushed by later input is a no-op.
    pub fn deliver_pending(&mut self, ticket: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => self.flush_pending(),
            _ => false,
        }
    }

    /// Deliver whatever reply is pending now.
    pub fn flush_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.transcript.push(pending.message);
                true
            }
            None => false,
        }
    }
}

/// A conversation plus the timer delivering its pending reply.
///
/// Dropping the session cancels the timer.
#[derive(Debug)]
pub struct ChatSession {
    conversation: Conversation,
    reply_timer: Option<ScopedTimer>,
}

impl ChatSession {
    pub fn new(settings: ConversationSettings) -> Self {
        Self {
            conversation: Conversation::new(settings),
            reply_timer: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// See [`Conversation::select_option`].
    pub fn select_option(&mut self, action: &str) -> Vec<Effect> {
        let effects = self.conversation.select_option(action);
        self.reply_timer = None;
        effects
    }
}

/// Submit free text on a shared session and schedule its delayed reply.
///
/// Returns false for blank input.
pub async fn submit_free_text(session: &Arc<Mutex<ChatSession>>, text: &str) -> bool {
    let mut guard = session.lock().await;
    let Some(ticket) = guard.conversation.submit_free_text(text) else {
        return false;
    };

    let delay = guard.conversation.settings.reply_delay;
    if delay.is_zero() {
        guard.conversation.deliver_pending(ticket);
        guard.reply_timer = None;
        return true;
    }

    let weak: Weak<Mutex<ChatSession>> = Arc::downgrade(session);
    guard.reply_timer = Some(ScopedTimer::after(delay, async move {
        if let Some(session) = weak.upgrade() {
            session.lock().await.conversation.deliver_pending(ticket);
        }
    }));
    true
}
