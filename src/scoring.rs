use std::cmp::Ordering;

use crate::error::AssignError;
use crate::models::{ScoredStudent, StudentRecord};

/// Reads a survey answer as a number, the way a lenient float parser does:
/// leading whitespace is skipped and the longest numeric prefix wins, so
/// `"4 - agree"` reads as 4. Anything without a numeric prefix, and any
/// non-finite result, counts as 0. `-0` reads as plain 0.
pub fn parse_score(value: &str) -> f64 {
    let text = value.trim_start();
    let prefix = &text[..numeric_prefix_len(text)];
    match prefix.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed + 0.0,
        _ => 0.0,
    }
}

fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    end
}

/// Orders roles by descending score. `sort_by` is stable, so equal scores
/// keep the order in which the properties were selected.
pub fn rank_preferences(values: &[(String, f64)]) -> Vec<String> {
    let mut ranked: Vec<&(String, f64)> = values.iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.into_iter().map(|(role, _)| role.clone()).collect()
}

pub fn score_student(record: &StudentRecord, properties: &[String]) -> ScoredStudent {
    let values: Vec<(String, f64)> = properties
        .iter()
        .map(|prop| (prop.clone(), parse_score(record.get(prop).unwrap_or("0"))))
        .collect();

    let aggregate_score = values.iter().map(|(_, value)| value).sum();

    ScoredStudent {
        record: record.clone(),
        preference_ranking: rank_preferences(&values),
        aggregate_score,
        assigned_role: None,
        placement: None,
    }
}

pub fn score_students(
    records: &[StudentRecord],
    properties: &[String],
) -> Result<Vec<ScoredStudent>, AssignError> {
    if properties.is_empty() {
        return Err(AssignError::NoProperties);
    }

    let scored: Vec<ScoredStudent> = records
        .iter()
        .map(|record| score_student(record, properties))
        .collect();

    tracing::debug!(
        students = scored.len(),
        properties = properties.len(),
        "scored roster"
    );
    Ok(scored)
}
