pub mod aggregate;
pub mod namespace;
pub mod threshold;

pub use aggregate::{AggregateError, PhotoEmbedding, aggregate};
pub use namespace::Namespace;
pub use threshold::{MAX_MATCH_THRESHOLD, MIN_MATCH_THRESHOLD, clamp_threshold};
