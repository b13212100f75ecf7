// Filter and pagination view logic - pure functions over the record list

use chrono::NaiveDate;

use crate::models::{CallStatus, Consultation};

/// Active filter predicates. `None` on a field means no constraint, the
/// "all" option of the corresponding dropdown. All predicates AND together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Case-insensitive substring match against name or contact.
    pub search: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub country: Option<String>,
    pub call_status: Option<CallStatus>,
    pub counsellor: Option<String>,
    pub interested_in: Option<String>,
    pub called_by: Option<String>,
    /// Exact calendar-day match against the submission timestamp.
    pub date: Option<NaiveDate>,
}

impl Filters {
    /// The district dropdown depends on the state dropdown, so picking a
    /// state resets the district.
    pub fn set_state(&mut self, state: Option<String>) {
        if state.is_some() {
            self.district = None;
        }
        self.state = state;
    }

    pub fn clear(&mut self) {
        *self = Filters::default();
    }

    pub fn is_active(&self) -> bool {
        *self != Filters::default()
    }

    pub fn matches(&self, record: &Consultation) -> bool {
        let query = self.search.trim().to_lowercase();
        let matches_search = query.is_empty()
            || record.name.to_lowercase().contains(&query)
            || record.contact.to_lowercase().contains(&query);

        let matches_state = self.state.as_deref().map_or(true, |s| record.state == s);
        let matches_district = self
            .district
            .as_deref()
            .map_or(true, |d| record.district_label() == d);
        let matches_country = self
            .country
            .as_deref()
            .map_or(true, |c| record.country_label() == c);
        let matches_status = self
            .call_status
            .map_or(true, |s| record.effective_status() == s);
        let matches_counsellor = self
            .counsellor
            .as_deref()
            .map_or(true, |c| record.counsellor_label() == c);
        let matches_interest = self
            .interested_in
            .as_deref()
            .map_or(true, |i| record.interested_in_label() == i);
        let matches_called_by = self
            .called_by
            .as_deref()
            .map_or(true, |n| record.called_by.as_deref() == Some(n));
        let matches_date = self.date.map_or(true, |day| {
            record
                .submitted_at
                .map_or(false, |submitted| submitted.date_naive() == day)
        });

        matches_search
            && matches_state
            && matches_district
            && matches_country
            && matches_status
            && matches_counsellor
            && matches_interest
            && matches_called_by
            && matches_date
    }
}

/// Records passing the active filters, in list order.
pub fn apply<'a>(records: &'a [Consultation], filters: &Filters) -> Vec<&'a Consultation> {
    records.iter().filter(|r| filters.matches(r)).collect()
}

/// One page of an already-filtered slice. Pages are 1-based; an
/// out-of-range page is empty. Returns the page and the total page count.
pub fn paginate<'a, T>(items: &'a [T], page: usize, per_page: usize) -> (&'a [T], usize) {
    if per_page == 0 || items.is_empty() {
        return (&[], 0);
    }
    let total_pages = items.len().div_ceil(per_page);
    let start = page.saturating_sub(1) * per_page;
    if start >= items.len() {
        return (&[], total_pages);
    }
    let end = (start + per_page).min(items.len());
    (&items[start..end], total_pages)
}

/// Distinct counsellor names for the filter dropdown, first-encountered order.
pub fn unique_counsellors(records: &[Consultation]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.preferred_counsellor.as_deref()))
}

/// Distinct districts for the filter dropdown, first-encountered order.
pub fn unique_districts(records: &[Consultation]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.district.as_deref()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
