//! # Robo Knights
//!
//! Self-play chess agents trained with an actor-critic policy gradient.
//! Two agents, one per colour, play full games against each other and each
//! learns from its own moves at the end of every game. Networks and
//! training run on the Burn ML framework's CPU backend.
//!
//! ## Modules
//!
//! - [`game`] — Chess rules: moves, positions, termination and draw rules
//! - [`environment`] — Reset/step wrapper with the material and checkmate reward
//! - [`ai`] — Agent trait, move codec, state encoding, policy/value network, actor-critic agent
//! - [`training`] — Self-play driver, trainer, rolling metrics, game records
//! - [`checkpoint`] — Versioned model file format
//! - [`ui`] — Terminal board viewer
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod environment;
pub mod error;
pub mod game;
pub mod training;
pub mod ui;
