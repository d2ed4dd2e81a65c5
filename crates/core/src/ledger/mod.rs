//! Transaction posting validation and running-balance math.

pub mod error;
pub mod posting;
pub mod types;

#[cfg(test)]
mod posting_props;

pub use error::LedgerError;
pub use posting::{signed_amount, PostingService};
pub use types::{AccountSnapshot, Direction, MetadataPatch, PostingInput, ResolvedPosting};
