mod handler;
mod model;

pub use handler::{get_room, list_rooms};
