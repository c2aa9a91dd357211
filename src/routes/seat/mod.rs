mod handler;
mod model;

pub use handler::{random_reserve, reserve_seat};
