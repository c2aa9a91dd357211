mod handler;
mod model;

pub use handler::{google_callback, google_login, logout};
