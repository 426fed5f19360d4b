//! HTTP request handlers.

pub mod feedback;
pub mod health;
pub mod questions;

pub use feedback::*;
pub use health::*;
pub use questions::*;
