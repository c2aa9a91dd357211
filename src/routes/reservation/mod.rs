mod handler;
pub mod model;

pub use handler::{bulk_delete, delete_reservation, update_reservation};
