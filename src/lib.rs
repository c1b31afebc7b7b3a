//! # Fabula - a free-text adventure engine
//!
//! Fabula turns player-typed sentences into game actions over a mutable
//! world of locations, objects, and dialogue, in the tradition of
//! browser-embeddable text adventures. Games are authored as JSON data; the
//! engine supplies the interpreter.
//!
//! ## Features
//!
//! - **Free-text commands**: a fixed-order verb pattern parser (`go`,
//!   `pick up`, `examine`, `use X on Y`, ...) with forgiving phrasing.
//! - **Location graph**: named directions between locations, optionally
//!   gated on puzzle state, with visit text and visit triggers.
//! - **Objects and inventory**: pick up, examine, use, and pair objects;
//!   single-hop dependencies between objects and paths.
//! - **Dialogue trees**: nested prompt/response chains with conditional
//!   visibility, repeatability control, and navigation side effects.
//! - **Victory conditions**: conjunctive multi-clause goals over location,
//!   inventory, used objects, visited locations, and chosen responses.
//! - **Pluggable persistence**: a three-key save contract with sled and
//!   in-memory backends; sessions degrade silently to no-save mode.
//! - **Extension triggers**: authored hooks calling host-registered
//!   functions with a handle back into the session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabula::engine::{Extensions, GameDefinition, Session};
//!
//! fn main() -> anyhow::Result<()> {
//!     let raw = std::fs::read_to_string("data/demo_game.json")?;
//!     let definition = GameDefinition::from_json(&raw)?;
//!     let mut session = Session::new(definition, None)?;
//!     let mut extensions = Extensions::new();
//!
//!     for line in session.start(&mut extensions) {
//!         println!("{}", line.rendered());
//!     }
//!     for line in session.submit("look around", &mut extensions) {
//!         println!("{}", line.rendered());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - data model, parser, resolver, dialogue, session turn loop
//! - [`storage`] - the save-store contract and its backends
//! - [`config`] - TOML runtime options for the bundled CLI
//! - [`validation`] - static game-data validation
//! - [`logutil`] - log sanitization for player input

pub mod config;
pub mod engine;
pub mod logutil;
pub mod storage;
pub mod validation;
