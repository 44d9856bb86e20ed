//! Features Module - Host Feature Engineering
//!
//! - `layout.rs`: authoritative feature order, version and hash
//! - `vector.rs`: named-field vector with positional conversion
//! - `builder.rs`: host facts → vector
//! - `stats.rs`: mean, variance, entropy

pub mod builder;
pub mod layout;
pub mod stats;
pub mod vector;


pub use builder::{FeatureBuilder, FeatureConfig};
pub use layout::{Feature, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
