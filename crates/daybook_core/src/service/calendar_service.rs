//! Journal container resolution service.
//!
//! # Responsibility
//! - Map canonical dates onto the year -> month/week -> day container
//!   hierarchy below a calendar root, creating missing containers lazily.
//! - Find or create the calendar root itself, honoring workspace scope.
//! - Repair week containers parented under the wrong year.
//!
//! # Invariants
//! - Found containers are returned unmodified; only misses create notes.
//! - Every ancestor container exists before its child is created.
//! - Each physical note creation (root, container, clone) is one atomic
//!   transaction; a note is never observable without its labels.
//! - The search-then-create sequence is not serialized across callers; a
//!   concurrent caller may create a duplicate container under the same
//!   label. Duplicates are accepted, never merged.

use crate::calendar::config::CalendarConfig;
use crate::calendar::dates::{
    first_of_month, first_of_year, format_date, local_now_date, parse_date, prior_year_end,
    start_of_week_date, week_number_in_year, week_of_year, StartOfWeek,
};
use crate::calendar::granularity::{Granularity, ParentLevel};
use crate::calendar::pattern::expand_title;
use crate::calendar::{CalendarError, CalendarResult};
use crate::model::note::{root_note_id, Note, NoteDraft, NoteId};
use crate::repo::attr_repo::{AttributeRepository, SqliteAttributeRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::search::label_query::{find_first_with_label, LabelQuery};
use chrono::{Datelike, NaiveDate};
use log::info;
use rusqlite::Connection;

const CALENDAR_ROOT_LABEL: &str = "calendarRoot";
const WORKSPACE_CALENDAR_ROOT_LABEL: &str = "workspaceCalendarRoot";
const SORTED_LABEL: &str = "sorted";
const TEMPLATE_RELATION: &str = "template";
const CALENDAR_ROOT_TITLE: &str = "Calendar";

/// Subtree visibility of the calling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkspaceScope {
    /// The whole store is visible.
    #[default]
    Global,
    /// The session is hoisted below this note.
    Subtree(NoteId),
}

/// Explicit per-call session state consumed at creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionContext {
    pub scope: WorkspaceScope,
    /// Whether protected content may be produced for this caller. A child
    /// inherits its parent's protected flag only when this is set.
    pub protected_content_available: bool,
}

/// Options for week resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekOptions {
    /// Overrides the root's `startOfTheWeek` configuration.
    pub start_of_week: Option<StartOfWeek>,
}

/// Calendar resolution facade over one store connection.
pub struct CalendarService<'conn> {
    conn: &'conn Connection,
    notes: SqliteNoteRepository<'conn>,
    attrs: SqliteAttributeRepository<'conn>,
    session: SessionContext,
}

impl<'conn> CalendarService<'conn> {
    /// Creates a service bound to one migrated connection and session state.
    pub fn new(conn: &'conn Connection, session: SessionContext) -> Self {
        Self {
            conn,
            notes: SqliteNoteRepository::new(conn),
            attrs: SqliteAttributeRepository::new(conn),
            session,
        }
    }

    /// Finds or creates the calendar root container.
    ///
    /// With a subtree scope, a `workspaceCalendarRoot` inside the scope wins
    /// over the global `calendarRoot`. Creation happens under the global
    /// root. Idempotent against an unchanged store.
    pub fn get_root_calendar_note(&self) -> CalendarResult<Note> {
        if let WorkspaceScope::Subtree(scope_root) = self.session.scope {
            let query = LabelQuery {
                name: WORKSPACE_CALENDAR_ROOT_LABEL,
                value: None,
                ancestor: Some(scope_root),
            };
            if let Some(note) = find_first_with_label(self.conn, &query)? {
                return Ok(note);
            }
        }

        if let Some(note) =
            find_first_with_label(self.conn, &LabelQuery::anywhere(CALENDAR_ROOT_LABEL))?
        {
            return Ok(note);
        }

        let mut draft = NoteDraft::with_title(CALENDAR_ROOT_TITLE);
        draft.labels = vec![
            (CALENDAR_ROOT_LABEL.to_string(), String::new()),
            (SORTED_LABEL.to_string(), String::new()),
        ];
        let note = self.notes.create_child_note(root_note_id(), &draft)?;
        info!(
            "event=calendar_root_created module=calendar status=ok note={}",
            note.uuid
        );
        Ok(note)
    }

    /// Finds or creates the year container for a canonical date.
    pub fn get_year_note(&self, date_str: &str, root: Option<&Note>) -> CalendarResult<Note> {
        self.granularity_note(Granularity::Year, date_str, root)
    }

    /// Finds or creates the month container for a canonical date.
    ///
    /// Under a weekly calendar month containers do not exist; resolution
    /// falls back to the day container of the first of the month.
    pub fn get_month_note(&self, date_str: &str, root: Option<&Note>) -> CalendarResult<Note> {
        self.granularity_note(Granularity::Month, date_str, root)
    }

    /// Finds or creates the day container for a canonical date.
    pub fn get_day_note(&self, date_str: &str, root: Option<&Note>) -> CalendarResult<Note> {
        self.granularity_note(Granularity::Day, date_str, root)
    }

    /// Finds or creates the day container for today's local date.
    pub fn get_today_note(&self, root: Option<&Note>) -> CalendarResult<Note> {
        self.get_day_note(&format_date(local_now_date()), root)
    }

    /// Finds or creates the week container for a canonical date.
    ///
    /// The week label is keyed to the week-owning year, which may differ
    /// from the date's own year around January 1st. An existing week note
    /// parented under the wrong year gains an additional parent link under
    /// the owning year's container.
    pub fn get_week_note(
        &self,
        date_str: &str,
        options: WeekOptions,
        root: Option<&Note>,
    ) -> CalendarResult<Note> {
        let date = parse_canonical(date_str)?;
        let root = self.root_or(root)?;
        let config = CalendarConfig::read(&self.attrs, root.uuid)?;
        let start = options.start_of_week.unwrap_or(config.start_of_week);
        self.resolve_week(date, start, &root, &config)
    }

    fn granularity_note(
        &self,
        granularity: Granularity,
        date_str: &str,
        root: Option<&Note>,
    ) -> CalendarResult<Note> {
        let date = parse_canonical(date_str)?;
        let root = self.root_or(root)?;
        let config = CalendarConfig::read(&self.attrs, root.uuid)?;
        self.resolve_container(granularity, date, &root, &config, config.start_of_week)
    }

    /// Generic find-or-create for one granularity under one root.
    fn resolve_container(
        &self,
        granularity: Granularity,
        date: NaiveDate,
        root: &Note,
        config: &CalendarConfig,
        start: StartOfWeek,
    ) -> CalendarResult<Note> {
        let value = match granularity {
            Granularity::Week => return self.resolve_week(date, start, root, config),
            Granularity::Year => format!("{:04}", date.year()),
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Day => format_date(date),
        };

        let query = LabelQuery::under(root.uuid, granularity.label_name(), &value);
        if let Some(existing) = find_first_with_label(self.conn, &query)? {
            return Ok(existing);
        }

        let parent = match config.kind.parent_level(granularity) {
            None => {
                // Granularity not present in this hierarchy: resolve the day
                // container for the canonically adjusted date instead.
                let adjusted = match granularity {
                    Granularity::Year => first_of_year(date),
                    Granularity::Month => first_of_month(date),
                    Granularity::Week | Granularity::Day => date,
                };
                return self.resolve_container(Granularity::Day, adjusted, root, config, start);
            }
            Some(ParentLevel::Root) => root.clone(),
            Some(ParentLevel::Container(parent_granularity)) => {
                self.resolve_container(parent_granularity, date, root, config, start)?
            }
        };

        let title = expand_title(config.pattern(granularity), date, start)?;
        self.create_container(granularity, &value, &title, &parent, config)
    }

    fn resolve_week(
        &self,
        date: NaiveDate,
        start: StartOfWeek,
        root: &Note,
        config: &CalendarConfig,
    ) -> CalendarResult<Note> {
        let raw_week = week_number_in_year(date, start);
        let (label_year, label_week) = if raw_week == 0 {
            // The date belongs to the final week of the prior Gregorian year.
            let prior_end = prior_year_end(date);
            (date.year() - 1, week_number_in_year(prior_end, start))
        } else {
            let owned = week_of_year(date, start);
            (owned.year, owned.week)
        };
        let label = format!("{label_year:04}WW{label_week}");

        let query = LabelQuery::under(root.uuid, Granularity::Week.label_name(), &label);
        if let Some(existing) = find_first_with_label(self.conn, &query)? {
            // Verify one parent carries the label year; otherwise the note is
            // mis-parented and gains an additional parent link under the
            // owning year's container. Identity never changes.
            let parents = self.notes.parent_notes(existing.uuid)?;
            if parents.is_empty() {
                return Err(CalendarError::StructuralIntegrity(format!(
                    "week note {} ({label}) has no parent notes",
                    existing.uuid
                )));
            }

            let label_year_value = format!("{label_year:04}");
            for parent in &parents {
                let year_value = self
                    .attrs
                    .owned_label_value(parent.uuid, Granularity::Year.label_name())?;
                if year_value.as_deref() == Some(label_year_value.as_str()) {
                    return Ok(existing);
                }
            }

            let parent = match config.kind.parent_level(Granularity::Week) {
                Some(ParentLevel::Root) => root.clone(),
                Some(ParentLevel::Container(parent_granularity)) => self.resolve_container(
                    parent_granularity,
                    year_anchor(date, label_year),
                    root,
                    config,
                    start,
                )?,
                None => {
                    return Err(CalendarError::StructuralIntegrity(format!(
                        "week note {label} exists but the active hierarchy has no week level"
                    )))
                }
            };

            let outcome = self.notes.clone_to(existing.uuid, parent.uuid)?;
            if !outcome.success {
                return Err(CalendarError::CloneFailure {
                    date: format_date(date),
                    message: outcome.message,
                });
            }
            info!(
                "event=week_note_reparented module=calendar status=ok label={label} note={} parent={}",
                existing.uuid, parent.uuid
            );
            return Ok(existing);
        }

        let parent = match config.kind.parent_level(Granularity::Week) {
            None => {
                // Weekly concept inapplicable: resolve the day container for
                // the start-of-week date instead.
                let week_start = start_of_week_date(date, start);
                return self.resolve_container(Granularity::Day, week_start, root, config, start);
            }
            Some(ParentLevel::Root) => root.clone(),
            Some(ParentLevel::Container(parent_granularity)) => self.resolve_container(
                parent_granularity,
                year_anchor(date, label_year),
                root,
                config,
                start,
            )?,
        };

        let title = expand_title(config.pattern(Granularity::Week), date, start)?;
        self.create_container(Granularity::Week, &label, &title, &parent, config)
    }

    fn create_container(
        &self,
        granularity: Granularity,
        value: &str,
        title: &str,
        parent: &Note,
        config: &CalendarConfig,
    ) -> CalendarResult<Note> {
        let mut draft = NoteDraft::with_title(title);
        draft.is_protected = parent.is_protected && self.session.protected_content_available;
        draft.labels = vec![
            (granularity.label_name().to_string(), value.to_string()),
            (SORTED_LABEL.to_string(), String::new()),
        ];
        if let Some(template) = config.template(granularity) {
            draft.relations.push((TEMPLATE_RELATION.to_string(), template));
        }

        let note = self.notes.create_child_note(parent.uuid, &draft)?;
        info!(
            "event=journal_container_created module=calendar status=ok granularity={} value={} note={}",
            granularity.name(),
            value,
            note.uuid
        );
        Ok(note)
    }

    fn root_or(&self, root: Option<&Note>) -> CalendarResult<Note> {
        match root {
            Some(note) => Ok(note.clone()),
            None => self.get_root_calendar_note(),
        }
    }
}

fn parse_canonical(date_str: &str) -> CalendarResult<NaiveDate> {
    parse_date(date_str).ok_or_else(|| CalendarError::InvalidDate(date_str.to_string()))
}

/// A date inside `year` suitable for resolving that year's container.
fn year_anchor(date: NaiveDate, year: i32) -> NaiveDate {
    if date.year() == year {
        date
    } else {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date)
    }
}
