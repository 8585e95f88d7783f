pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "records")]
pub mod records;

pub use error::VentureLinkError;
pub use types::*;

/// Standard result type for all venturelink operations
pub type VentureLinkResult<T> = Result<T, VentureLinkError>;
