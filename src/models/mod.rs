pub mod message;
pub mod provider;

pub use message::{ConversationTurn, Role};
pub use provider::{ProviderConfig, ProviderKind};
