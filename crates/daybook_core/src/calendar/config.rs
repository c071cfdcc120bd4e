//! Per-root calendar configuration.
//!
//! # Responsibility
//! - Read the calendar root's configuration labels/relations into a typed
//!   view with built-in defaults.
//!
//! # Invariants
//! - Configuration is re-read on every resolution call, never cached, so
//!   edits take effect on the next call.
//! - Closed vocabularies (`calendarType`, `startOfTheWeek`) reject unknown
//!   values instead of silently defaulting.

use crate::calendar::dates::StartOfWeek;
use crate::calendar::granularity::{CalendarKind, Granularity};
use crate::calendar::{CalendarError, CalendarResult};
use crate::model::note::NoteId;
use crate::repo::attr_repo::AttributeRepository;

const CALENDAR_TYPE_LABEL: &str = "calendarType";
const START_OF_WEEK_LABEL: &str = "startOfTheWeek";

/// Typed snapshot of one calendar root's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    pub kind: CalendarKind,
    pub start_of_week: StartOfWeek,
    year_pattern: Option<String>,
    month_pattern: Option<String>,
    week_pattern: Option<String>,
    day_pattern: Option<String>,
    year_template: Option<NoteId>,
    month_template: Option<NoteId>,
    week_template: Option<NoteId>,
    day_template: Option<NoteId>,
}

impl CalendarConfig {
    /// Reads configuration from the root's owned labels and relations.
    pub fn read(attrs: &impl AttributeRepository, root: NoteId) -> CalendarResult<Self> {
        let kind = match attrs.owned_label_value(root, CALENDAR_TYPE_LABEL)? {
            None => CalendarKind::Monthly,
            Some(value) => CalendarKind::parse_label(&value).ok_or_else(|| {
                CalendarError::Configuration {
                    name: CALENDAR_TYPE_LABEL.to_string(),
                    value,
                }
            })?,
        };

        let start_of_week = match attrs.owned_label_value(root, START_OF_WEEK_LABEL)? {
            None => StartOfWeek::Monday,
            Some(value) => StartOfWeek::parse_label(&value).ok_or_else(|| {
                CalendarError::Configuration {
                    name: START_OF_WEEK_LABEL.to_string(),
                    value,
                }
            })?,
        };

        Ok(Self {
            kind,
            start_of_week,
            year_pattern: attrs.owned_label_value(root, Granularity::Year.pattern_label())?,
            month_pattern: attrs.owned_label_value(root, Granularity::Month.pattern_label())?,
            week_pattern: attrs.owned_label_value(root, Granularity::Week.pattern_label())?,
            day_pattern: attrs.owned_label_value(root, Granularity::Day.pattern_label())?,
            year_template: attrs
                .owned_relation_target(root, Granularity::Year.template_relation())?,
            month_template: attrs
                .owned_relation_target(root, Granularity::Month.template_relation())?,
            week_template: attrs
                .owned_relation_target(root, Granularity::Week.template_relation())?,
            day_template: attrs.owned_relation_target(root, Granularity::Day.template_relation())?,
        })
    }

    /// Effective title pattern for one granularity.
    pub fn pattern(&self, granularity: Granularity) -> &str {
        let configured = match granularity {
            Granularity::Year => &self.year_pattern,
            Granularity::Month => &self.month_pattern,
            Granularity::Week => &self.week_pattern,
            Granularity::Day => &self.day_pattern,
        };
        configured
            .as_deref()
            .unwrap_or_else(|| granularity.default_pattern())
    }

    /// Template note for one granularity, if the root configures one.
    pub fn template(&self, granularity: Granularity) -> Option<NoteId> {
        match granularity {
            Granularity::Year => self.year_template,
            Granularity::Month => self.month_template,
            Granularity::Week => self.week_template,
            Granularity::Day => self.day_template,
        }
    }
}
