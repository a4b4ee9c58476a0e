//! Transient user-facing messages
//!
//! Every message is removed after a fixed time to live. Removal runs as a
//! tokio task whose handle is kept next to the message, so dismissing a
//! message early cancels its timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::AbortHandle;

/// Default time a message stays visible
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Success => write!(f, "success"),
            MessageKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MessageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(MessageId)
            .map_err(|_| format!("Invalid message id: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub kind: MessageKind,
}

type Listener = Box<dyn Fn(&Message) + Send + Sync>;

#[derive(Default)]
struct Board {
    next_id: u64,
    messages: Vec<Message>,
    timers: HashMap<MessageId, AbortHandle>,
}

impl Board {
    fn remove(&mut self, id: MessageId) -> bool {
        self.timers.remove(&id);
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }
}

/// Stack of transient messages
#[derive(Clone)]
pub struct Notifier {
    board: Arc<Mutex<Board>>,
    listener: Option<Arc<Listener>>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TTL)
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("ttl", &self.ttl)
            .field("active", &self.active().len())
            .finish()
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            board: Arc::new(Mutex::new(Board::default())),
            listener: None,
            ttl,
        }
    }

    /// Call `listener` for every message as it is shown
    pub fn on_show<F>(mut self, listener: F) -> Self
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(Box::new(listener)));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn success(&self, text: impl Into<String>) -> MessageHandle {
        self.show(text, MessageKind::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> MessageHandle {
        self.show(text, MessageKind::Error)
    }

    /// Append a message and schedule its removal.
    ///
    /// Outside a tokio runtime no timer can be scheduled; the message then
    /// stays until it is dismissed.
    pub fn show(&self, text: impl Into<String>, kind: MessageKind) -> MessageHandle {
        let message = {
            let mut board = self.lock();
            board.next_id += 1;
            let message = Message {
                id: MessageId(board.next_id),
                text: text.into(),
                kind,
            };
            board.messages.push(message.clone());
            message
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let board = Arc::clone(&self.board);
                let ttl = self.ttl;
                let id = message.id;
                let task = runtime.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    let mut board = board.lock().unwrap_or_else(|e| e.into_inner());
                    board.remove(id);
                });
                let mut board = self.lock();
                // The timer may already have fired if the TTL is zero.
                if board.messages.iter().any(|m| m.id == id) {
                    board.timers.insert(id, task.abort_handle());
                }
            }
            Err(_) => {
                tracing::warn!(id = %message.id, "no runtime, message will not expire");
            }
        }

        match kind {
            MessageKind::Success => tracing::info!(message = %message.text, "notify"),
            MessageKind::Error => tracing::warn!(message = %message.text, "notify"),
        }
        if let Some(listener) = &self.listener {
            listener(&message);
        }

        MessageHandle {
            id: message.id,
            board: Arc::clone(&self.board),
        }
    }

    /// Remove a message now and cancel its timer
    pub fn dismiss(&self, id: MessageId) -> bool {
        let mut board = self.lock();
        if let Some(timer) = board.timers.get(&id) {
            timer.abort();
        }
        board.remove(id)
    }

    /// Messages currently shown, oldest first
    pub fn active(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Number of removal timers still pending
    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle to one shown message
#[derive(Debug)]
pub struct MessageHandle {
    id: MessageId,
    board: Arc<Mutex<Board>>,
}

impl MessageHandle {
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Remove the message now and cancel its timer
    pub fn dismiss(self) -> bool {
        let mut board = self.board.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = board.timers.get(&self.id) {
            timer.abort();
        }
        board.remove(self.id)
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("messages", &self.messages)
            .finish()
    }
}
