//! Picks a short list of skills to emphasize in a generated study plan.
//!
//! The heuristic only fires when there is both a signal (a low baseline
//! section score) and a gap (some skill with sparse practice history). For
//! every weak section, the first clusters of that subject in catalog order are
//! taken, a few skills from each, and the concatenation is capped.

use super::{BaselineDiagnostic, Skill, SkillProgress};
use crate::config::WeakSkillPolicy;

/// Returns skill ids to focus on, earlier sections and clusters first.
/// Nothing actionable yields an empty list.
pub fn choose_weak_skills(
    baseline: &[BaselineDiagnostic],
    progress: &[SkillProgress],
    catalog: &[Skill],
    policy: &WeakSkillPolicy,
) -> Vec<String> {
    let has_sparse = progress
        .iter()
        .any(|p| p.seen < policy.sparse_seen_threshold);
    if !has_sparse || baseline.is_empty() {
        return Vec::new();
    }

    let mut picked = Vec::new();
    for diagnostic in baseline
        .iter()
        .filter(|d| d.score < policy.low_score_threshold)
    {
        for cluster in clusters_for_subject(catalog, &diagnostic.section)
            .into_iter()
            .take(policy.clusters_per_section)
        {
            picked.extend(
                cluster
                    .into_iter()
                    .take(policy.skills_per_cluster)
                    .map(|skill| skill.id.clone()),
            );
        }
    }

    picked.truncate(policy.max_skills);
    picked
}

/// Skills of one subject grouped by cluster, clusters in order of first
/// appearance in the catalog.
fn clusters_for_subject<'a>(catalog: &'a [Skill], subject: &str) -> Vec<Vec<&'a Skill>> {
    let mut clusters: Vec<(&str, Vec<&Skill>)> = Vec::new();
    for skill in catalog.iter().filter(|s| s.subject == subject) {
        match clusters.iter_mut().find(|(name, _)| *name == skill.cluster) {
            Some((_, members)) => members.push(skill),
            None => clusters.push((skill.cluster.as_str(), vec![skill])),
        }
    }
    clusters.into_iter().map(|(_, members)| members).collect()
}
