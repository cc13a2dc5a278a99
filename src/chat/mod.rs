//! Stylist chat: keyword intent parsing, scripted answers and the chat session.

pub mod chips;
pub mod intent;
pub mod script;
pub mod session;

pub use chips::{ChipPicker, ChipRow};
pub use intent::{ParsedIntent, parse_intent};
pub use script::{FALLBACK_REPLY, QUICK_QUESTIONS, scripted_reply};
pub use session::{ChatMessage, ChatSession, Role};
