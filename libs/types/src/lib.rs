//! Types library for the token exchange read model
//!
//! This library provides the core type definitions shared by the projection
//! service, ensuring type safety and deterministic decimal arithmetic.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, AccountId, TokenId)
//! - `numeric`: Fixed-point decimal types (Amount, Price)
//! - `order`: Immutable orders and their terminal records
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod order;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::errors::*;
}
