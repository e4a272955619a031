//! Core types for ingredient compliance audits: query/result values, approval feed, reference tables.

pub mod approval;
pub mod feed;
pub mod ingredient;
pub mod reference;

pub use approval::{Alert, ApprovedIngredient, Region, Severity};
pub use feed::ApprovalFeed;
pub use ingredient::{
    ComplianceStatus, GroundingLink, IngredientQuery, IngredientResult, RegionDetail,
    ValidationError,
};
