//! Signed events and their tags.
//!
//! - **model** — [`Event`], canonical serialization, ids, author signatures.
//! - **tag** — [`Tag`] / [`Tags`], the typed tag vocabulary.

pub mod model;
pub mod tag;

pub use model::{unix_now, Event};
pub use tag::{Tag, Tags};
