//! # Markdraft Architecture
//!
//! Markdraft is the **state core of a markdown editor**: saved documents,
//! the open session, its version history and its per-document stylesheet.
//! It renders nothing and owns no event loop; a shell (browser, desktop,
//! terminal) embeds it and drives it through [`api::MarkdraftApi`].
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - One owned value per editor window                        │
//! │  - Keeps session, history, store and autosave consistent    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Save, rename, delete, list, stylesheet edits             │
//! │  - Returns CmdResult with structured messages               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engines                                                    │
//! │  - session.rs: bound/unbound state, dirty tracking          │
//! │  - history.rs: branch-pruning undo/redo log                 │
//! │  - stylesheet/: selector-targeted rule patching             │
//! │  - ai/, export.rs, autosave.rs                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Persistence trait: FsBackend, MemBackend                 │
//! │  - DocumentStore: ids, title rules, atomic commits          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Everything takes plain Rust arguments and returns plain Rust types. No
//! module writes to stdout, exits the process, or reads the clock for
//! anything the caller might want to control: autosave takes the current
//! [`Instant`](std::time::Instant) as an argument.
//!
//! Logging goes through `tracing`; the host installs a subscriber if it wants
//! the output.
//!
//! ## Testing Strategy
//!
//! 1. **Engines and commands**: unit tests next to the code, over
//!    [`store::memory::InMemoryStore`].
//! 2. **API**: wiring tests in `api.rs`.
//! 3. **Integration** (`tests/`): the filesystem backend and full editing
//!    flows, async generation included.
//!
//! Enable the `test_utils` feature to use `store::memory::fixtures` from
//! other crates.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade
//! - [`commands`]: document-level business logic
//! - [`session`], [`history`], [`stylesheet`]: the editing engines
//! - [`ai`]: generation boundary and the HTTP client
//! - [`autosave`], [`export`]: drafts and output files
//! - [`table`]: markdown table builder
//! - [`store`]: persistence
//! - [`config`], [`error`], [`model`]: shared types

pub mod ai;
pub mod api;
pub mod autosave;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod model;
pub mod session;
pub mod store;
pub mod stylesheet;
pub mod table;

pub use api::MarkdraftApi;
pub use error::{MarkdraftError, Result};
