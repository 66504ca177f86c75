//! Message-passing runtime for Calor ranks.
//!
//! A fixed group of ranks runs one thread each. Ranks share no mutable
//! state: every byte moves through a [`Communicator`], which owns one
//! outgoing channel per destination and one incoming channel per source.
//!
//! # Semantics
//!
//! - Sends are buffered and never block.
//! - Receives block until a message with the requested `(source, tag)`
//!   arrives. Earlier messages with other tags are held back and matched
//!   later, so messages between one pair of ranks with the same tag are
//!   delivered in send order.
//! - A rank that exits (error or panic) drops its channels; peers blocked
//!   on it fail with [`CommError::Disconnected`] instead of hanging.
//!
//! [`launch`] spawns the ranks and collects each one's result.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collective;
pub mod communicator;
pub mod error;
pub mod payload;
pub mod world;

pub use communicator::{Communicator, RecvRequest, Tag};
pub use error::CommError;
pub use payload::{Element, Payload};
pub use world::{communicators, launch};
