//! AI Study Buddy
//!
//! Helps students reflect on how they use AI tools for learning: a usage
//! journal, a habit assessment with heuristic scoring, and personalised
//! feedback produced by an external completion service.

pub mod assessment;
pub mod challenges;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod feedback;
pub mod journal;
pub mod literacy;
pub mod scoring;
pub mod session;
pub mod web;

pub use error::{Result, StudyError};
pub use web::{router, AppState};
