//! Autotile rule sets, neighbor signatures, and collider synthesis.
#![forbid(unsafe_code)]

pub mod collider;
pub mod config;
pub mod matcher;
pub mod registry;
pub mod types;

pub use collider::{ColliderParams, classify_pattern, collider_for_rule};
pub use matcher::{cliff_signature, match_rule, transition_signature};
pub use registry::RuleSetRegistry;
pub use types::{Neighbor, Occupancy, RuleSet, Signature, TilingRule};
