//! Core provenance tracker implementation
//!
//! The `ProvenanceTracker` is the single sink for mapping events during one
//! conversion run. Events are kept in one append-only log in recording order;
//! the five per-category logs of a [`MappingResult`] are views over it.

use crate::conversion::provenance::statistics::MappingStatistics;
use crate::conversion::provenance::types::{MappingEvent, MappingKind, MappingResult};
use crate::conversion::source::FieldReferenceTable;
use std::collections::HashMap;
use tracing::trace;

const UNMAPPED_NOTE: &str = "Exists in DataX but not referenced in template";

/// Tracker for recording the fate of every field during a conversion
#[derive(Debug, Default)]
pub struct ProvenanceTracker {
    events: Vec<MappingEvent>,
    /// Index for field lookups (target or source path -> event indices)
    field_index: HashMap<String, Vec<usize>>,
}

impl ProvenanceTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value copied unchanged from the source document
    pub fn record_direct(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        value: &str,
        note: &str,
    ) {
        self.push(
            MappingEvent::new(MappingKind::Direct, note)
                .with_source(source)
                .with_target(target)
                .with_value(Some(value)),
        );
    }

    /// Record a value changed by the filter(s) named in `filter`
    pub fn record_transform(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        value: &str,
        filter: &str,
    ) {
        self.push(
            MappingEvent::new(MappingKind::Transform, filter)
                .with_source(source)
                .with_target(target)
                .with_value(Some(value)),
        );
    }

    /// Record a value supplied by a default rather than the source document
    pub fn record_default(&mut self, target: Option<&str>, value: &str, note: &str) {
        self.push(
            MappingEvent::new(MappingKind::Default, note)
                .with_target(target)
                .with_value(Some(value)),
        );
    }

    /// Record a referenced source field that could not be resolved
    pub fn record_missing(&mut self, source: &str, target: Option<&str>, reason: &str) {
        self.push(
            MappingEvent::new(MappingKind::Missing, reason)
                .with_source(Some(source))
                .with_target(target),
        );
    }

    /// Record a source field that no template consumed
    pub fn record_unmapped(&mut self, source: &str, value: Option<&str>, note: &str) {
        self.push(
            MappingEvent::new(MappingKind::Unmapped, note)
                .with_source(Some(source))
                .with_value(value),
        );
    }

    /// Emit one Unmapped event per table entry that was never referenced
    pub fn compute_unmapped(&mut self, table: &FieldReferenceTable) {
        let unreferenced: Vec<(String, String)> = table
            .unreferenced()
            .map(|(path, value)| (path.to_string(), value.to_string()))
            .collect();

        for (path, value) in unreferenced {
            self.record_unmapped(&path, Some(&value), UNMAPPED_NOTE);
        }
    }

    /// Clear every log; called between independent conversions
    pub fn reset(&mut self) {
        self.events.clear();
        self.field_index.clear();
    }

    /// Events recorded for a target (or source, when no target) path
    pub fn events_for_field(&self, field: &str) -> Vec<&MappingEvent> {
        self.field_index
            .get(field)
            .map(|indices| indices.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default()
    }

    pub fn events(&self) -> &[MappingEvent] {
        &self.events
    }

    pub fn count(&self, kind: MappingKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn statistics(&self) -> MappingStatistics {
        MappingStatistics {
            direct: self.count(MappingKind::Direct),
            transform: self.count(MappingKind::Transform),
            default: self.count(MappingKind::Default),
            missing: self.count(MappingKind::Missing),
            unmapped: self.count(MappingKind::Unmapped),
        }
    }

    pub fn statistics_text(&self) -> String {
        self.statistics().to_string()
    }

    /// Freeze the logs into a [`MappingResult`], leaving the tracker intact
    pub fn to_result(&self) -> MappingResult {
        let mut result = MappingResult {
            success: true,
            ..MappingResult::default()
        };

        for event in &self.events {
            let log = match event.kind {
                MappingKind::Direct => &mut result.direct,
                MappingKind::Transform => &mut result.transform,
                MappingKind::Default => &mut result.defaults,
                MappingKind::Missing => &mut result.missing,
                MappingKind::Unmapped => &mut result.unmapped,
            };
            log.push(event.clone());
        }

        result
    }

    fn push(&mut self, event: MappingEvent) {
        trace!(
            kind = %event.kind,
            source_path = event.source_path.as_deref().unwrap_or(""),
            target_path = event.target_path.as_deref().unwrap_or(""),
            "mapping event"
        );

        let index = self.events.len();
        if let Some(field) = event.field() {
            self.field_index
                .entry(field.to_string())
                .or_default()
                .push(index);
        }
        self.events.push(event);
    }
}
