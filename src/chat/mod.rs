//! Chat assistant — scripted branching dialog, keyword fallback for free
//! text, and delayed replies.

pub mod classifier;
pub mod engine;
pub mod model;
pub mod responses;
pub mod routes;

pub use engine::{ChatSession, Conversation, ConversationSettings, Effect};
pub use model::{ActionKey, ChatOption, Message, Origin, Transcript};
pub use routes::{ChatRouteState, chat_routes};
