pub mod session;

pub use session::{CachedSession, SESSION_COOKIE, SessionStore};
