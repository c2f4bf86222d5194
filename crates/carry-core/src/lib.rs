pub mod error;
pub mod types;
pub mod waterfall;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::CarryError;
pub use types::*;

/// Standard result type for all carry-core operations
pub type CarryResult<T> = Result<T, CarryError>;
