//! REST API handlers

pub mod health;
pub mod webhook;

pub use health::*;
pub use webhook::*;
