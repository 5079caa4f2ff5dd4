//! Per-run mutable state: the provenance tracker and the reference table
//!
//! One `ConversionState` belongs to exactly one conversion. Batch callers
//! either build a fresh one per document or call [`ConversionState::reset_for`].

use crate::conversion::provenance::{MappingResult, ProvenanceTracker};
use crate::conversion::source::{FieldReferenceTable, SourceDocument};

#[derive(Debug, Default)]
pub struct ConversionState {
    tracker: ProvenanceTracker,
    references: FieldReferenceTable,
}

impl ConversionState {
    pub fn new(doc: &SourceDocument) -> Self {
        Self {
            tracker: ProvenanceTracker::new(),
            references: FieldReferenceTable::build(doc.root()),
        }
    }

    /// Discard all events and rebuild the reference table for `doc`
    pub fn reset_for(&mut self, doc: &SourceDocument) {
        self.tracker.reset();
        self.references = FieldReferenceTable::build(doc.root());
    }

    pub fn tracker(&self) -> &ProvenanceTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ProvenanceTracker {
        &mut self.tracker
    }

    pub fn references(&self) -> &FieldReferenceTable {
        &self.references
    }

    pub fn references_mut(&mut self) -> &mut FieldReferenceTable {
        &mut self.references
    }

    /// Compute unmapped fields and freeze the logs
    ///
    /// Consumes the state so unmapped detection runs exactly once per run.
    pub fn finish(mut self) -> MappingResult {
        self.tracker.compute_unmapped(&self.references);
        self.tracker.to_result()
    }
}
