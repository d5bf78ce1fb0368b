//! Honeytrap Test - shared test utilities.
//!
//! This crate provides a scriptable token store and fixtures that can be
//! used across honeytrap crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! honeytrap-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use honeytrap_test::{ScriptedTokenStore, VerifyOutcome};
//!
//! let store = ScriptedTokenStore::new(dir.path(), vec![dir.path().join("a.txt")]);
//! store.push_verify(VerifyOutcome::Missing(vec!["a.txt".into()]));
//! assert!(supervisor.start().await.is_err());
//! assert_eq!(store.verify_calls(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
