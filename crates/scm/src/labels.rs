//! Canonical label taxonomy and label-set reconciliation.
//!
//! Labels are applied group by group. Groups are isolated from each other:
//! an error aborts the remainder of its own group and the next group is
//! still attempted, so a half-applied taxonomy is recovered by re-running.

use tracing::{info, warn};

use crate::client::ResourceClient;
use crate::error::ScmError;
use crate::models::{LabelKey, LabelSpec, RepoKey};
use crate::reconcile::{Label, Reconciler};

/// A named group of labels applied together, in declared order.
#[derive(Debug, Clone)]
pub struct LabelGroup {
    pub name: String,
    pub labels: Vec<LabelSpec>,
}

impl LabelGroup {
    pub fn new(name: impl Into<String>, labels: Vec<LabelSpec>) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }
}

/// An ordered collection of label groups.
#[derive(Debug, Clone)]
pub struct LabelSet {
    pub groups: Vec<LabelGroup>,
}

impl LabelSet {
    /// The standard taxonomy: five priorities, four issue types, two
    /// workflow states.
    pub fn standard() -> Self {
        Self {
            groups: vec![
                LabelGroup::new(
                    "priority",
                    vec![
                        LabelSpec::new(
                            ":fire: P0",
                            "D93F0B",
                            "Fire. Drop everything and fix this ASAP.",
                        ),
                        LabelSpec::new(
                            ":triangular_flag_on_post: P1",
                            "FFA500",
                            "High priority. Resolve in the next few days.",
                        ),
                        LabelSpec::new(":warning: P2", "FBCA04", "Important. Resolve by next release."),
                        LabelSpec::new(
                            ":grey_exclamation: P3",
                            "0E8A16",
                            "Low priority. Possibly nice to have. Resolve if time allows.",
                        ),
                        LabelSpec::new(
                            ":icecream: P4",
                            "1D76DB",
                            "Extremely low priority. Probably not worth spending time on right now.",
                        ),
                    ],
                ),
                LabelGroup::new(
                    "issue-type",
                    vec![
                        LabelSpec::new(":bug: bug", "D93F0B", "Something isn't working."),
                        LabelSpec::new(
                            ":muscle: improvement",
                            "A2EEEF",
                            "An improvement on something existing.",
                        ),
                        LabelSpec::new(":sparkles: feature", "5319E7", "New feature or request."),
                        LabelSpec::new(
                            ":money_mouth_face: tech debt",
                            "000000",
                            "Things weighing down the stack over the long-term.",
                        ),
                    ],
                ),
                LabelGroup::new(
                    "state",
                    vec![
                        LabelSpec::new(
                            ":no_entry_sign: blocked",
                            "D93F0B",
                            "Blocked on something external. Waiting to be unblocked.",
                        ),
                        LabelSpec::new(
                            ":eyes: awaiting review",
                            "FBCA04",
                            "Requires review before proceeding.",
                        ),
                    ],
                ),
            ],
        }
    }

    /// Total number of labels across all groups.
    pub fn label_count(&self) -> usize {
        self.groups.iter().map(|g| g.labels.len()).sum()
    }

    /// Validate every label locally, before any network traffic.
    ///
    /// # Errors
    /// Returns `InvalidSpec` for the first label that fails validation.
    pub fn validate(&self) -> Result<(), ScmError> {
        for group in &self.groups {
            for label in &group.labels {
                validate_label(label)?;
            }
        }
        Ok(())
    }
}

/// Outcome of applying one group.
#[derive(Debug)]
pub struct GroupOutcome {
    pub group: String,
    pub created: usize,
    pub updated: usize,
    /// First error hit in the group; the rest of the group was skipped.
    pub error: Option<ScmError>,
}

/// Per-group outcomes for a full label-set application.
#[derive(Debug, Default)]
pub struct LabelSetReport {
    pub groups: Vec<GroupOutcome>,
}

impl LabelSetReport {
    /// True when every group applied without error.
    pub fn is_complete(&self) -> bool {
        self.groups.iter().all(|g| g.error.is_none())
    }

    pub fn created(&self) -> usize {
        self.groups.iter().map(|g| g.created).sum()
    }

    pub fn updated(&self) -> usize {
        self.groups.iter().map(|g| g.updated).sum()
    }

    /// Names of the groups that failed.
    pub fn failed_groups(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|g| g.error.is_some())
            .map(|g| g.group.as_str())
            .collect()
    }
}

/// Apply a label set to a repository.
///
/// Specs are validated up front; an invalid one fails the whole call before
/// any network traffic. Group failures are isolated (see module docs) and
/// reported rather than returned, so callers decide whether a partial
/// application fails their run.
///
/// # Errors
/// Returns `InvalidSpec` when local validation fails.
pub async fn reconcile_label_set<C: ResourceClient>(
    reconciler: &Reconciler<C>,
    repo: &RepoKey,
    set: &LabelSet,
) -> Result<LabelSetReport, ScmError> {
    set.validate()?;

    let mut report = LabelSetReport::default();
    for group in &set.groups {
        report.groups.push(apply_group(reconciler, repo, group).await);
    }

    if report.is_complete() {
        info!(
            repository = %repo,
            created = report.created(),
            updated = report.updated(),
            "Label set reconciled"
        );
    } else {
        warn!(
            repository = %repo,
            failed_groups = ?report.failed_groups(),
            "Label set applied with failures"
        );
    }

    Ok(report)
}

async fn apply_group<C: ResourceClient>(
    reconciler: &Reconciler<C>,
    repo: &RepoKey,
    group: &LabelGroup,
) -> GroupOutcome {
    let mut outcome = GroupOutcome {
        group: group.name.clone(),
        created: 0,
        updated: 0,
        error: None,
    };

    for label in &group.labels {
        let key = LabelKey::of(repo, label.name.clone());
        match reconciler.reconcile::<Label>(&key, label).await {
            Ok(applied) => {
                if applied.was_created() {
                    outcome.created += 1;
                } else {
                    outcome.updated += 1;
                }
            }
            Err(e) => {
                warn!(
                    group = %group.name,
                    label = %label.name,
                    error = %e,
                    "Label reconcile failed, skipping rest of group"
                );
                outcome.error = Some(e);
                break;
            }
        }
    }

    outcome
}

fn validate_label(label: &LabelSpec) -> Result<(), ScmError> {
    if label.name.trim().is_empty() {
        return Err(ScmError::InvalidSpec("label name is empty".to_string()));
    }
    if label.color.len() != 6 || !label.color.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ScmError::InvalidSpec(format!(
            "label '{}' color '{}' is not six hex digits",
            label.name, label.color
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_taxonomy_shape() {
        let set = LabelSet::standard();

        assert_eq!(set.label_count(), 11);
        let group_names: Vec<&str> = set.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, ["priority", "issue-type", "state"]);
        let sizes: Vec<usize> = set.groups.iter().map(|g| g.labels.len()).collect();
        assert_eq!(sizes, [5, 4, 2]);
    }

    #[test]
    fn test_standard_taxonomy_validates() {
        assert!(LabelSet::standard().validate().is_ok());
    }

    #[test]
    fn test_standard_taxonomy_values() {
        let set = LabelSet::standard();
        let priority = &set.groups[0];

        assert_eq!(priority.labels[0].name, ":fire: P0");
        assert_eq!(priority.labels[0].color, "D93F0B");
        assert_eq!(priority.labels[4].name, ":icecream: P4");
        assert_eq!(priority.labels[4].color, "1D76DB");

        let state = &set.groups[2];
        assert_eq!(state.labels[1].name, ":eyes: awaiting review");
        assert_eq!(state.labels[1].description, "Requires review before proceeding.");
    }

    #[test]
    fn test_color_validation() {
        assert!(validate_label(&LabelSpec::new("x", "D93F0B", "")).is_ok());
        assert!(validate_label(&LabelSpec::new("x", "#D93F0B", "")).is_err());
        assert!(validate_label(&LabelSpec::new("x", "D93F0", "")).is_err());
        assert!(validate_label(&LabelSpec::new("x", "GGGGGG", "")).is_err());
        assert!(validate_label(&LabelSpec::new("  ", "D93F0B", "")).is_err());
    }

    #[test]
    fn test_report_accounting() {
        let report = LabelSetReport {
            groups: vec![
                GroupOutcome {
                    group: "priority".to_string(),
                    created: 5,
                    updated: 0,
                    error: None,
                },
                GroupOutcome {
                    group: "state".to_string(),
                    created: 1,
                    updated: 0,
                    error: Some(ScmError::InvalidSpec("boom".to_string())),
                },
            ],
        };

        assert!(!report.is_complete());
        assert_eq!(report.created(), 6);
        assert_eq!(report.failed_groups(), ["state"]);
    }
}
