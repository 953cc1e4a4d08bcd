//! Request handlers.

pub mod compose;
pub mod health;
