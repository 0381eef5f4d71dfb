//! scgrade-core: order, response and grading engine for single-choice
//! questions with distractors.
//!
//! This crate defines the question model, the per-attempt display order, the
//! response model and the grading engine that the rest of scgrade builds on.
//! Scoring methods themselves are plugged in through [`strategy`].

pub mod access;
pub mod attempt;
pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod order;
pub mod parser;
pub mod report;
pub mod response;
pub mod statistics;
pub mod strategy;
pub mod text;
pub mod traits;
