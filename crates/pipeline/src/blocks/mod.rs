//! Feature block implementations for the encoder.
//!
//! This module contains the three concrete blocks that make up a feature
//! vector, in the order the encoder lays them out.

pub mod text;
pub mod categorical;
pub mod numeric;

// Re-export for convenience
pub use categorical::CategoricalBlock;
pub use numeric::NumericBlock;
pub use text::TextBlock;
