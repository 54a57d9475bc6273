//! Core domain entities.
//!
//! - [`ShortLink`] - A code-to-target mapping with expiry and click counter
//! - [`User`] - A registered account
//!
//! Creation inputs are separate structs (`NewShortLink`, `NewUser`) carrying
//! only the fields the caller supplies; storage assigns the rest.

pub mod short_link;
pub mod user;

pub use short_link::{NewShortLink, ShortLink};
pub use user::{NewUser, User};
