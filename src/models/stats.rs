// Derived aggregates - recomputed in full whenever the record list changes

use chrono::{DateTime, Datelike, Utc};

use super::consultation::{CallStatus, Consultation};

/// Summary cards for the students view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentStats {
    pub total_students: usize,
    /// Rounded mean over records with a parseable score; 0 when none have one.
    pub avg_neet_score: i64,
    /// Records whose `created_at` falls in the current calendar month.
    pub new_this_month: usize,
    /// Most frequent preferred country (after the "Guidance" relabel),
    /// ties broken by first-encountered order. "N/A" when nothing counts.
    pub top_country: String,
}

impl StudentStats {
    pub fn compute(records: &[Consultation], now: DateTime<Utc>) -> Self {
        if records.is_empty() {
            return Self {
                top_country: "N/A".to_string(),
                ..Self::default()
            };
        }

        let scores: Vec<f64> = records.iter().filter_map(Consultation::neet_score_value).collect();
        let avg_neet_score = if scores.is_empty() {
            0
        } else {
            (scores.iter().sum::<f64>() / scores.len() as f64).round() as i64
        };

        let new_this_month = records
            .iter()
            .filter_map(|r| r.created_at)
            .filter(|created| created.month() == now.month() && created.year() == now.year())
            .count();

        let mut country_counts: Vec<(&str, usize)> = Vec::new();
        for record in records {
            if let Some(country) = record.aggregation_country() {
                match country_counts.iter_mut().find(|(name, _)| *name == country) {
                    Some((_, count)) => *count += 1,
                    None => country_counts.push((country, 1)),
                }
            }
        }
        let top_country = country_counts
            .into_iter()
            .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            total_students: records.len(),
            avg_neet_score,
            new_this_month,
            top_country,
        }
    }
}

/// Summary for the call report view. Only the canonical statuses are
/// counted; legacy values on old records fall outside every bucket, same
/// as the report the team already reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallStats {
    pub total_calls: usize,
    pub completed: usize,
    pub scheduled: usize,
    pub not_called: usize,
    pub missed: usize,
    pub dead_leads: usize,
    pub going_abroad: usize,
    /// Distinct non-empty caller names, first-encountered order.
    pub unique_callers: Vec<String>,
}

impl CallStats {
    pub fn compute(records: &[Consultation]) -> Self {
        let mut stats = Self {
            total_calls: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.effective_status() {
                CallStatus::Completed => stats.completed += 1,
                CallStatus::Scheduled => stats.scheduled += 1,
                CallStatus::NotCalled => stats.not_called += 1,
                CallStatus::Missed => stats.missed += 1,
                CallStatus::DeadLeads => stats.dead_leads += 1,
                CallStatus::GoingAbroad => stats.going_abroad += 1,
                _ => {}
            }
            if let Some(caller) = record.called_by.as_deref().filter(|c| !c.is_empty()) {
                if !stats.unique_callers.iter().any(|c| c == caller) {
                    stats.unique_callers.push(caller.to_string());
                }
            }
        }
        stats
    }
}
