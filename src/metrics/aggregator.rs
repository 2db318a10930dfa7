//! eNPS and satisfaction aggregation.
//!
//! This module turns a collection of employee records into an
//! [`AggregateResult`]. It is pure: no I/O, no state between calls.

use crate::models::{AggregateResult, Classification, EmployeeRecord, ScoreScale};

/// Aggregate eNPS classification counts, eNPS score and mean overall score.
///
/// Records without a retention response still count towards
/// `total_employees`. Responses outside the scale are ignored the same way
/// as unanswered ones.
pub fn aggregate(records: &[EmployeeRecord], scale: ScoreScale) -> AggregateResult {
    let mut result = AggregateResult {
        total_employees: records.len(),
        ..AggregateResult::default()
    };

    let mut score_sum = 0.0;
    let mut score_count = 0usize;

    for record in records {
        if let Some(class) = record
            .retention_expectation
            .and_then(|value| scale.classify(value))
        {
            match class {
                Classification::Promoter => result.promoters += 1,
                Classification::Neutral => result.neutrals += 1,
                Classification::Detractor => result.detractors += 1,
            }
        }

        if let Some(score) = record.overall_score {
            if score <= scale.max() as f64 {
                score_sum += score;
                score_count += 1;
            }
        }
    }

    result.enps_score = enps(result.promoters, result.detractors, result.valid_responses());
    result.average_score = if score_count > 0 {
        Some(score_sum / score_count as f64)
    } else {
        None
    };

    result
}

/// eNPS = round((promoters - detractors) / valid * 100), half away from zero.
///
/// Computed on integers so that exact halves (e.g. 12.5) are never
/// misrounded by float error.
pub fn enps(promoters: usize, detractors: usize, valid: usize) -> Option<i32> {
    if valid == 0 {
        return None;
    }

    let numerator = (promoters as i64 - detractors as i64) * 100;
    let denominator = valid as i64;
    let magnitude = (2 * numerator.abs() + denominator) / (2 * denominator);

    Some((numerator.signum() * magnitude) as i32)
}
