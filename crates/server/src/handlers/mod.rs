//! HTTP request handlers.

pub mod assets;
pub mod health;

pub use assets::*;
pub use health::*;
