//! Honeytrap Tokens - decoy files that trip an alert when touched.
//!
//! This crate provides:
//! - The [`TokenStore`] interface the supervisor consumes (protected path
//!   list, idempotent verify/recreate, watch root)
//! - [`DecoyDirectory`], a store that keeps the default decoy set on disk
//!
//! # Example
//!
//! ```rust,no_run
//! use honeytrap_tokens::{DecoyDirectory, TokenStore};
//!
//! # fn main() -> Result<(), honeytrap_tokens::TokenError> {
//! let store = DecoyDirectory::new("honey_tokens")?;
//! store.create_all()?;
//!
//! for (name, present) in store.verify_and_recreate_missing()? {
//!     println!("{name}: {present}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod decoys;
mod error;
mod store;

pub use decoys::{DecoySpec, default_decoys};
pub use error::{TokenError, TokenResult};
pub use store::{DecoyDirectory, TokenInfo, TokenStore};
