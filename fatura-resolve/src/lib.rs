//! fatura-resolve: description canonicalization and mapping resolution.
//!
//! Noisy merchant descriptions (`UBER   *TRIP 0412`) resolve against an
//! account's learned mappings to a simplified description and category.
//! Matching is exact on the canonical form only (precision over recall), so
//! a category is never silently wrong.

pub mod enrich;
pub mod mapping;

pub use enrich::{EnrichedTransaction, EnrichmentReport, enrich_transactions};
pub use mapping::{DescriptionMapping, MappingSnapshot, ResolvedDescription, normalize, resolve};
