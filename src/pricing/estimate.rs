//! Usage-based price estimation from file sizes and conflict state.

use std::path::Path;

use git2::Repository;
use serde::Serialize;
use tracing::{debug, warn};

use crate::commit::changes::FileSource;
use crate::error::GitError;
use crate::git::inspect_status;

/// Bytes per resource unit (KiB).
pub const BYTES_PER_KIB: f64 = 1024.0;

/// Price per resource unit.
pub const PRICE_PER_UNIT: f64 = 3.0;

/// Lowest price ever charged, applied after rounding.
pub const MINIMUM_PRICE: f64 = 0.50;

/// Complexity multiplier when the repository has unmerged paths.
pub const CONFLICT_COMPLEXITY: f64 = 2.0;

/// Inputs to the estimator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInput {
    pub file_sizes: Vec<u64>,
    pub has_conflicts: bool,
}

impl UsageInput {
    pub fn estimate(&self) -> UsageResult {
        estimate_usage_cost(&self.file_sizes, self.has_conflicts)
    }
}

/// Estimated resource usage and the price derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResult {
    pub resource_usage: f64,
    pub price: f64,
}

/// Estimate plus the conflict flag, as reported for a file selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub resource_usage: f64,
    pub price: f64,
    pub has_merge_conflicts: bool,
}

/// Compute resource usage and price.
///
/// `resource_usage` is total KiB, doubled when there are conflicts. The price
/// is three per unit, rounded to cents, and never below [`MINIMUM_PRICE`].
pub fn estimate_usage_cost(file_sizes: &[u64], has_conflicts: bool) -> UsageResult {
    let total_size = file_sizes
        .iter()
        .fold(0u64, |acc, size| acc.saturating_add(*size));
    let complexity = if has_conflicts { CONFLICT_COMPLEXITY } else { 1.0 };

    let resource_usage = (total_size as f64 / BYTES_PER_KIB) * complexity;
    let price = round_cents(resource_usage * PRICE_PER_UNIT).max(MINIMUM_PRICE);

    UsageResult {
        resource_usage,
        price,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price the selected files against the repository's current conflict state.
///
/// Files whose size cannot be read are skipped.
pub fn calculate_resource_usage<F: FileSource + ?Sized>(
    repo: &Repository,
    files: &[String],
    source: &F,
) -> Result<UsageReport, GitError> {
    let file_sizes: Vec<u64> = files
        .iter()
        .filter_map(|path| match source.size(Path::new(path)) {
            Ok(size) => Some(size),
            Err(e) => {
                warn!("Skipping {path} in usage calculation: {e}");
                None
            }
        })
        .collect();

    let has_merge_conflicts = inspect_status(repo)?.has_conflicts();
    let usage = estimate_usage_cost(&file_sizes, has_merge_conflicts);

    debug!(
        "Usage for {} files: {:.3} units, ${:.2}, conflicts={}",
        file_sizes.len(),
        usage.resource_usage,
        usage.price,
        has_merge_conflicts
    );

    Ok(UsageReport {
        resource_usage: usage.resource_usage,
        price: usage.price,
        has_merge_conflicts,
    })
}
