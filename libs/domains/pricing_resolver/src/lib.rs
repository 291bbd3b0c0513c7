//! Pricing resolver (spec component C6): normalizes a region, fetches the
//! provider's catalog for a resource type (24h cache, negative lookups
//! cached short-TTL), and scores candidates against requested attributes to
//! produce a confidence-rated set of normalized prices.

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod models;
pub mod region;
pub mod resolver;

pub use error::{ResolverError, ResolverResult};
pub use handlers::ApiDoc;
pub use models::{LookupMetadata, LookupRequest, LookupResponse, NormalizedPrice};
pub use resolver::PricingResolver;
