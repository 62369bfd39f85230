pub mod session_store;

pub use session_store::{
    FileSessionStore, MemorySessionStore, SessionStore, PENDING_EMAIL_KEY, TOKEN_KEY,
};
