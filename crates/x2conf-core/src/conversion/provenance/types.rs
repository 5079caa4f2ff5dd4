//! Mapping event types and the frozen mapping result
//!
//! These are the only structures handed to reporting. Everything here is
//! plain data and serializes with serde for machine-readable output.

use crate::conversion::provenance::statistics::MappingStatistics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fate of one field during a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// Value copied from the source document as-is
    Direct,
    /// Value changed by one or more filters
    Transform,
    /// Value supplied by a `default` filter or the template itself
    Default,
    /// Referenced source field absent or empty
    Missing,
    /// Source field present but never referenced
    Unmapped,
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingKind::Direct => write!(f, "direct"),
            MappingKind::Transform => write!(f, "transform"),
            MappingKind::Default => write!(f, "default"),
            MappingKind::Missing => write!(f, "missing"),
            MappingKind::Unmapped => write!(f, "unmapped"),
        }
    }
}

/// A single provenance record
///
/// `note` carries the filter label for Transform events and a human readable
/// reason for all other kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEvent {
    pub kind: MappingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub note: String,
}

impl MappingEvent {
    pub fn new(kind: MappingKind, note: impl Into<String>) -> Self {
        Self {
            kind,
            source_path: None,
            target_path: None,
            value: None,
            note: note.into(),
        }
    }

    pub fn with_source(mut self, source: Option<&str>) -> Self {
        self.source_path = source.map(str::to_string);
        self
    }

    pub fn with_target(mut self, target: Option<&str>) -> Self {
        self.target_path = target.map(str::to_string);
        self
    }

    pub fn with_value(mut self, value: Option<&str>) -> Self {
        self.value = value.map(str::to_string);
        self
    }

    /// Filter label of a Transform event
    pub fn filter_name(&self) -> Option<&str> {
        match self.kind {
            MappingKind::Transform => Some(&self.note),
            _ => None,
        }
    }

    /// Field the event is indexed under: the target when known, else the source
    pub fn field(&self) -> Option<&str> {
        self.target_path
            .as_deref()
            .or(self.source_path.as_deref())
    }
}

/// Frozen aggregate of one conversion's mapping events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    pub direct: Vec<MappingEvent>,
    pub transform: Vec<MappingEvent>,
    pub defaults: Vec<MappingEvent>,
    pub missing: Vec<MappingEvent>,
    pub unmapped: Vec<MappingEvent>,

    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reader_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_template: Option<String>,
}

impl MappingResult {
    /// A result describing a conversion that failed before producing output
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn events(&self, kind: MappingKind) -> &[MappingEvent] {
        match kind {
            MappingKind::Direct => &self.direct,
            MappingKind::Transform => &self.transform,
            MappingKind::Default => &self.defaults,
            MappingKind::Missing => &self.missing,
            MappingKind::Unmapped => &self.unmapped,
        }
    }

    pub fn statistics(&self) -> MappingStatistics {
        MappingStatistics {
            direct: self.direct.len(),
            transform: self.transform.len(),
            default: self.defaults.len(),
            missing: self.missing.len(),
            unmapped: self.unmapped.len(),
        }
    }

    pub fn event_count(&self) -> usize {
        self.statistics().total()
    }

    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }
}
