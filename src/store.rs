// In-memory consultation store - full replace on fetch, patch on update
//
// All durable state lives behind the API; this store only mirrors the last
// committed fetch. Mutations happen on a single task, so no locking.

use chrono::Utc;

use crate::filters::{self, Filters};
use crate::models::{CallStats, Consultation, StudentStats};

/// Handle for one dispatched fetch. Only the most recently dispatched
/// ticket may commit, so a slow response can never overwrite fresher data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
pub struct ConsultationStore {
    records: Vec<Consultation>,
    filters: Filters,
    selection: Vec<String>,
    student_stats: StudentStats,
    call_stats: CallStats,
    dispatched: u64,
}

impl ConsultationStore {
    pub fn new() -> Self {
        Self {
            student_stats: StudentStats::compute(&[], Utc::now()),
            ..Self::default()
        }
    }

    /// Registers a new fetch dispatch and returns its ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.dispatched += 1;
        FetchTicket(self.dispatched)
    }

    /// Commits a completed fetch. The full list is replaced, the selection
    /// is pruned to surviving ids, and both aggregates are recomputed.
    /// Returns false (leaving the store untouched) when a newer fetch has
    /// been dispatched since this ticket was issued.
    pub fn commit_fetch(&mut self, ticket: FetchTicket, records: Vec<Consultation>) -> bool {
        if ticket.0 != self.dispatched {
            tracing::warn!(
                "discarding stale fetch result (ticket {} superseded by {})",
                ticket.0,
                self.dispatched
            );
            return false;
        }
        self.records = records;
        let records = &self.records;
        self.selection
            .retain(|id| records.iter().any(|r| &r.id == id));
        self.recompute();
        true
    }

    /// Patches the record matching the echo's id with its call-tracking
    /// fields, then recomputes both aggregates from the full list. History
    /// is only taken from the echo when the server actually sent it.
    /// Returns false when no record matches.
    pub fn apply_update(&mut self, updated: Consultation) -> bool {
        let Some(slot) = self.records.iter_mut().find(|r| r.id == updated.id) else {
            tracing::warn!("update for unknown consultation {} ignored", updated.id);
            return false;
        };
        slot.call_status = updated.call_status;
        slot.call_notes = updated.call_notes;
        slot.called_by = updated.called_by;
        slot.called_by_id = updated.called_by_id;
        slot.last_called_at = updated.last_called_at;
        if !updated.call_history.is_empty() {
            slot.call_history = updated.call_history;
        }
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.student_stats = StudentStats::compute(&self.records, Utc::now());
        self.call_stats = CallStats::compute(&self.records);
    }

    pub fn records(&self) -> &[Consultation] {
        &self.records
    }

    pub fn student_stats(&self) -> &StudentStats {
        &self.student_stats
    }

    pub fn call_stats(&self) -> &CallStats {
        &self.call_stats
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    /// Records passing the active filters, in list order.
    pub fn filtered(&self) -> Vec<&Consultation> {
        filters::apply(&self.records, &self.filters)
    }

    pub fn select(&mut self, id: &str) {
        if !self.selection.iter().any(|s| s == id) {
            self.selection.push(id.to_string());
        }
    }

    pub fn deselect(&mut self, id: &str) {
        self.selection.retain(|s| s != id);
    }

    /// Replaces the selection with exactly the records currently passing
    /// the active filters - not the full list, and not the old selection.
    pub fn select_all_filtered(&mut self) {
        self.selection = self.filtered().iter().map(|r| r.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected ids, including any that the active filters currently hide.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Selected records resolved against the current list, in list order.
    pub fn selected_records(&self) -> Vec<&Consultation> {
        self.records
            .iter()
            .filter(|r| self.selection.iter().any(|id| id == &r.id))
            .collect()
    }
}
