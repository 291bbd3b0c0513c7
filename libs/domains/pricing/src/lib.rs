//! Pricing Domain
//!
//! This module provides a complete domain implementation for managing cloud pricing data.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Business logic, price comparison
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{PricingError, PricingResult};
pub use models::{
    CloudProvider, CreatePriceEntry, Currency, Money, PriceEntry, PriceFilter, PricingUnit,
    ResourceType, UpdatePriceEntry,
};
pub use postgres::PgPricingRepository;
pub use repository::PricingRepository;
pub use service::PricingService;
