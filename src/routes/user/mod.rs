mod handler;
pub mod model;

pub use handler::{export_tokens, get_me};
