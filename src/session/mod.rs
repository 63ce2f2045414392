//! 会话：单会话状态、上下文组装、多会话容器

pub mod context;
pub mod state;
pub mod store;

pub use state::{HistoryEntry, SessionState};
pub use store::{Session, SessionId, SessionStore};
