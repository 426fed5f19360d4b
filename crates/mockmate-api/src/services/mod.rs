//! External and on-disk service clients.

pub mod gemini;
pub mod question_bank;

pub use gemini::*;
pub use question_bank::*;
