pub mod executor;
pub mod history;
pub mod response;
pub mod service;
pub mod types;
pub mod validator;

pub use executor::{Gateway, DEFAULT_DEADLINE, DEFAULT_USER_AGENT};
pub use history::{HistoryRecord, HistoryStore, InMemoryHistoryStore};
pub use service::{ForwardService, ForwardServiceExt};
pub use types::*;
pub use validator::{validate, ValidatedRequest};
