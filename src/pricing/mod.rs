//! Pricing: usage cost estimation and the free usage window.

pub mod estimate;
pub mod free_usage;

pub use estimate::{
    MINIMUM_PRICE, UsageInput, UsageReport, UsageResult, calculate_resource_usage,
    estimate_usage_cost,
};
pub use free_usage::{FreeUsageState, FreeUsageWindow};
