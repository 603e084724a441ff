//! Session configuration.
//!
//! `ortkit` stops at producing [`SessionOptions`]: which execution providers a session will use, and how it logs.

pub mod builder;

pub use self::builder::{SessionBuilder, SessionOptions};
