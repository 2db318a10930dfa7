//! Area, hierarchy and tenure rollups.
//!
//! Every per-area figure here is produced by [`aggregate`] over that area's
//! partition; this module only partitions, orders and picks extremes.

use crate::metrics::aggregator::aggregate;
use crate::models::{
    AreaRollup, AreaSummary, EmployeeRecord, HierarchyEntry, HierarchyLevel, HierarchyNode,
    ScoreScale, TenureBucket,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Partition records by area (first-encountered order) and aggregate each.
pub fn rollup_by_area(records: &[EmployeeRecord], scale: ScoreScale) -> AreaRollup {
    let mut order: Vec<(String, Option<String>)> = Vec::new();
    let mut partitions: HashMap<&str, Vec<EmployeeRecord>> = HashMap::new();

    for record in records {
        let partition = partitions.entry(record.area_id.as_str()).or_insert_with(|| {
            order.push((record.area_id.clone(), record.area_name.clone()));
            Vec::new()
        });
        partition.push(record.clone());
    }

    let areas = order
        .into_iter()
        .map(|(area_id, area_name)| {
            let members = partitions.remove(area_id.as_str()).unwrap_or_default();
            (area_id, area_name, members)
        })
        .collect();

    rollup_areas(areas, scale)
}

/// Aggregate a known list of areas, keeping empty ones.
///
/// Used when the area list comes from the hierarchy endpoint, so areas with
/// no employees still show up with zero counts.
pub fn rollup_areas(
    areas: Vec<(String, Option<String>, Vec<EmployeeRecord>)>,
    scale: ScoreScale,
) -> AreaRollup {
    let summaries: Vec<AreaSummary> = areas
        .into_iter()
        .map(|(area_id, area_name, members)| {
            let area_name =
                area_name.or_else(|| members.iter().find_map(|r| r.area_name.clone()));
            let metrics = aggregate(&members, scale);
            debug!(
                "Area {}: {} employees, {} valid responses",
                area_id,
                metrics.total_employees,
                metrics.valid_responses()
            );
            AreaSummary {
                area_id,
                area_name,
                metrics,
            }
        })
        .collect();

    let best = select_extreme(&summaries, Ordering::Greater);
    let worst = select_extreme(&summaries, Ordering::Less);
    let mean_enps = mean_enps(&summaries);

    AreaRollup {
        areas: summaries,
        best,
        worst,
        mean_enps,
    }
}

/// Index of the area whose eNPS compares as `wanted` against all others.
/// Ties keep the first-encountered area; areas without eNPS are skipped.
fn select_extreme(areas: &[AreaSummary], wanted: Ordering) -> Option<usize> {
    let mut selected: Option<(usize, i32)> = None;

    for (index, area) in areas.iter().enumerate() {
        let Some(score) = area.metrics.enps_score else {
            continue;
        };
        match selected {
            Some((_, current)) if score.cmp(&current) != wanted => {}
            _ => selected = Some((index, score)),
        }
    }

    selected.map(|(index, _)| index)
}

fn mean_enps(areas: &[AreaSummary]) -> Option<f64> {
    let scores: Vec<i32> = areas.iter().filter_map(|a| a.metrics.enps_score).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64)
}

/// Build a directorate → management → coordination → area headcount tree.
///
/// `counts` maps area id to headcount; areas missing from it count as zero.
/// Node order follows first appearance in `entries`. Parent totals are the
/// sum of their children, so an area listed twice is counted once.
pub fn rollup_hierarchy(
    entries: &[HierarchyEntry],
    counts: &HashMap<String, usize>,
) -> Vec<HierarchyNode> {
    let mut directorates: Vec<HierarchyNode> = Vec::new();

    for entry in entries {
        let directorate = child_mut(
            &mut directorates,
            &entry.directorate_id,
            &entry.directorate,
            HierarchyLevel::Directorate,
        );
        let management = child_mut(
            &mut directorate.children,
            &entry.management_id,
            &entry.management,
            HierarchyLevel::Management,
        );
        let coordination = child_mut(
            &mut management.children,
            &entry.coordination_id,
            &entry.coordination,
            HierarchyLevel::Coordination,
        );
        let area = child_mut(
            &mut coordination.children,
            &entry.area_id,
            &entry.area_name,
            HierarchyLevel::Area,
        );
        area.total_employees = counts.get(&entry.area_id).copied().unwrap_or(0);
    }

    for directorate in &mut directorates {
        sum_children(directorate);
    }

    directorates
}

/// Set every non-leaf total to the sum of its children. Returns the node total.
fn sum_children(node: &mut HierarchyNode) -> usize {
    if !node.children.is_empty() {
        node.total_employees = node.children.iter_mut().map(sum_children).sum();
    }
    node.total_employees
}

/// Hierarchy entries under one directorate, matched by id or by name.
pub fn filter_directorate(entries: &[HierarchyEntry], directorate: &str) -> Vec<HierarchyEntry> {
    let wanted = directorate.trim();
    entries
        .iter()
        .filter(|e| e.directorate_id == wanted || e.directorate == wanted)
        .cloned()
        .collect()
}

fn child_mut<'a>(
    nodes: &'a mut Vec<HierarchyNode>,
    id: &str,
    name: &str,
    level: HierarchyLevel,
) -> &'a mut HierarchyNode {
    let index = match nodes.iter().position(|n| n.id == id) {
        Some(index) => index,
        None => {
            nodes.push(HierarchyNode {
                id: id.to_string(),
                name: name.to_string(),
                level,
                total_employees: 0,
                children: Vec::new(),
            });
            nodes.len() - 1
        }
    };
    &mut nodes[index]
}

/// Headcount per tenure bucket, in first-encountered order.
///
/// Percentages are relative to records that carry a bucket, rounded to
/// two decimals.
pub fn tenure_distribution(records: &[EmployeeRecord]) -> Vec<TenureBucket> {
    let mut buckets: Vec<TenureBucket> = Vec::new();

    for label in records.iter().filter_map(|r| r.tenure_bucket.as_deref()) {
        match buckets.iter_mut().find(|b| b.label == label) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(TenureBucket {
                label: label.to_string(),
                count: 1,
                percentage: 0.0,
            }),
        }
    }

    let total: usize = buckets.iter().map(|b| b.count).sum();
    for bucket in &mut buckets {
        let pct = bucket.count as f64 * 100.0 / total as f64;
        bucket.percentage = (pct * 100.0).round() / 100.0;
    }

    buckets
}
