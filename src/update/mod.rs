//! Update workflow: analyze and price a selection, then pay, commit, push, and record.

use std::path::Path;

use chrono::{DateTime, Utc};
use git2::{Oid, Repository};
use serde::Serialize;
use tracing::{debug, info};

use crate::commit::{ChangeAnalysis, FileSource, analyze_changes, stage_paths};
use crate::error::UpdateError;
use crate::git::{Pusher, relativize, repository_name, workdir};
use crate::payment::{PaymentGateway, PaymentMethod};
use crate::pricing::{UsageReport, calculate_resource_usage};
use crate::profile::{KeyValueStore, Profile, UsageRecord};

/// Everything shown to the user before they confirm an update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlan {
    pub repository: String,
    /// Selected files, relative to the repository root.
    pub files: Vec<String>,
    pub analysis: ChangeAnalysis,
    pub usage: UsageReport,
    /// Whether this update uses the free usage window.
    pub free: bool,
}

impl UpdatePlan {
    pub fn amount_due(&self) -> f64 {
        if self.free { 0.0 } else { self.usage.price }
    }

    /// Paths that will be committed: the selected files that are new or modified.
    pub fn changed_paths(&self) -> Vec<String> {
        self.analysis
            .changes
            .iter()
            .map(|c| c.path.clone())
            .collect()
    }
}

/// Result of a completed update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub commit: Oid,
    pub record: UsageRecord,
}

/// Analyze and price the selected files.
///
/// `files` may be absolute or relative to the repository root.
pub fn plan_update<F, S>(
    repo: &Repository,
    files: &[impl AsRef<Path>],
    source: &F,
    profile: &Profile<S>,
    now: DateTime<Utc>,
    sample_limit: usize,
) -> Result<UpdatePlan, UpdateError>
where
    F: FileSource + ?Sized,
    S: KeyValueStore,
{
    if files.is_empty() {
        return Err(UpdateError::NoFilesSelected);
    }

    let root = workdir(repo)?;
    let files = files
        .iter()
        .map(|f| relativize(root, f.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let analysis = analyze_changes(repo, &files, source, sample_limit)?;
    if analysis.changes.is_empty() {
        return Err(UpdateError::NothingToCommit);
    }
    let usage = calculate_resource_usage(repo, &files, source)?;
    let free = profile.free_usage().is_eligible(now);

    debug!(
        "Planned update: {} files, price ${:.2}, free={}",
        files.len(),
        usage.price,
        free
    );

    Ok(UpdatePlan {
        repository: repository_name(root),
        files,
        analysis,
        usage,
        free,
    })
}

/// Stage, charge (unless free), commit, push, and record the update.
///
/// Only the files the analysis reported as new or modified are committed.
/// Staging, the author identity, and the parent commit are all resolved
/// before payment, so a declined charge or a staging failure leaves no
/// commit behind and never charges for a commit that cannot be made.
#[allow(clippy::too_many_arguments)]
pub fn execute_update<S, G, P>(
    repo: &Repository,
    plan: &UpdatePlan,
    message: &str,
    gateway: &G,
    method: Option<PaymentMethod>,
    pusher: &P,
    profile: &mut Profile<S>,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome, UpdateError>
where
    S: KeyValueStore,
    G: PaymentGateway + ?Sized,
    P: Pusher + ?Sized,
{
    if plan.files.is_empty() {
        return Err(UpdateError::NoFilesSelected);
    }
    if message.trim().is_empty() {
        return Err(UpdateError::EmptyMessage);
    }

    let paths = plan.changed_paths();
    if paths.is_empty() {
        return Err(UpdateError::NothingToCommit);
    }
    let staged = stage_paths(repo, &paths)?;

    let mut window = profile.free_usage();
    if plan.free {
        // Fails if the window was consumed since the plan was made.
        window.consume(now)?;
    } else {
        let amount = plan.amount_due();
        let method = method.ok_or(UpdateError::PaymentMethodRequired(amount))?;
        if !gateway.charge(method, amount)? {
            return Err(UpdateError::PaymentDeclined);
        }
        info!("Charged ${amount:.2} via {method}");
    }

    let commit = staged.commit(message)?;
    pusher.push(workdir(repo)?)?;

    let record = UsageRecord {
        date: now,
        repository: plan.repository.clone(),
        file_count: paths.len(),
        free: plan.free,
        price: plan.usage.price,
    };
    profile.record_usage(record.clone())?;

    if plan.free {
        profile.save_free_usage(&window)?;
    }

    info!("Updated {} ({})", plan.repository, commit);
    Ok(UpdateOutcome { commit, record })
}
