use daybook_core::db::open_db_in_memory;
use daybook_core::{
    root_note_id, AttributeRepository, CalendarError, CalendarService, NoteDraft, NoteRepository,
    SessionContext, SqliteAttributeRepository, SqliteNoteRepository, WorkspaceScope,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> CalendarService<'_> {
    CalendarService::new(conn, SessionContext::default())
}

#[test]
fn root_calendar_note_is_created_once_and_tagged() {
    let conn = setup();
    let service = service(&conn);

    let root = service.get_root_calendar_note().unwrap();
    assert_eq!(root.title, "Calendar");

    let attrs = SqliteAttributeRepository::new(&conn);
    assert_eq!(
        attrs.owned_label_value(root.uuid, "calendarRoot").unwrap(),
        Some(String::new())
    );
    assert_eq!(
        attrs.owned_label_value(root.uuid, "sorted").unwrap(),
        Some(String::new())
    );

    let again = service.get_root_calendar_note().unwrap();
    assert_eq!(again.uuid, root.uuid);
}

#[test]
fn workspace_scope_prefers_workspace_calendar_root() {
    let conn = setup();
    let notes = SqliteNoteRepository::new(&conn);

    let workspace = notes
        .create_child_note(root_note_id(), &NoteDraft::with_title("Work"))
        .unwrap();
    let mut draft = NoteDraft::with_title("Work journal");
    draft.labels = vec![("workspaceCalendarRoot".to_string(), String::new())];
    let workspace_root = notes.create_child_note(workspace.uuid, &draft).unwrap();

    let scoped = CalendarService::new(
        &conn,
        SessionContext {
            scope: WorkspaceScope::Subtree(workspace.uuid),
            protected_content_available: false,
        },
    );
    assert_eq!(
        scoped.get_root_calendar_note().unwrap().uuid,
        workspace_root.uuid
    );

    // A global session ignores the workspace-scoped root.
    let global = service(&conn);
    let global_root = global.get_root_calendar_note().unwrap();
    assert_ne!(global_root.uuid, workspace_root.uuid);
    assert_eq!(global_root.title, "Calendar");
}

#[test]
fn day_resolution_builds_the_monthly_chain_with_default_titles() {
    let conn = setup();
    let service = service(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);
    let notes = SqliteNoteRepository::new(&conn);

    let day = service.get_day_note("2024-03-15", None).unwrap();
    assert_eq!(day.title, "15 - Friday");
    assert_eq!(
        attrs.owned_label_value(day.uuid, "dateNote").unwrap(),
        Some("2024-03-15".to_string())
    );

    let month = notes.parent_notes(day.uuid).unwrap().remove(0);
    assert_eq!(month.title, "03 - March");
    assert_eq!(
        attrs.owned_label_value(month.uuid, "monthNote").unwrap(),
        Some("2024-03".to_string())
    );

    let year = notes.parent_notes(month.uuid).unwrap().remove(0);
    assert_eq!(year.title, "2024");
    assert_eq!(
        attrs.owned_label_value(year.uuid, "yearNote").unwrap(),
        Some("2024".to_string())
    );

    let calendar_root = notes.parent_notes(year.uuid).unwrap().remove(0);
    assert_eq!(calendar_root.title, "Calendar");
}

#[test]
fn repeated_resolution_returns_the_same_note_identity() {
    let conn = setup();
    let service = service(&conn);

    let first = service.get_day_note("2024-03-15", None).unwrap();
    let second = service.get_day_note("2024-03-15", None).unwrap();
    assert_eq!(first.uuid, second.uuid);

    // Only one day container may exist afterwards.
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM attributes WHERE name = 'dateNote' AND value = '2024-03-15';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn year_resolution_canonicalizes_any_date_in_the_year() {
    let conn = setup();
    let service = service(&conn);

    let from_march = service.get_year_note("2024-03-15", None).unwrap();
    let from_january = service.get_year_note("2024-01-01", None).unwrap();
    assert_eq!(from_march.uuid, from_january.uuid);
}

#[test]
fn custom_patterns_on_the_root_take_effect_immediately() {
    let conn = setup();
    let service = service(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let root = service.get_root_calendar_note().unwrap();
    attrs
        .create_label(root.uuid, "datePattern", "{isoDate} ({weekDay3})")
        .unwrap();

    let day = service.get_day_note("2024-03-15", None).unwrap();
    assert_eq!(day.title, "2024-03-15 (Fri)");
}

#[test]
fn unknown_pattern_token_fails_resolution() {
    let conn = setup();
    let service = service(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let root = service.get_root_calendar_note().unwrap();
    attrs
        .create_label(root.uuid, "yearPattern", "{bogus}")
        .unwrap();

    let err = service.get_year_note("2024-03-15", None).unwrap_err();
    assert!(matches!(
        err,
        CalendarError::UnknownPattern { ref token } if token == "bogus"
    ));
}

#[test]
fn invalid_calendar_type_fails_with_configuration_error() {
    let conn = setup();
    let service = service(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let root = service.get_root_calendar_note().unwrap();
    attrs
        .create_label(root.uuid, "calendarType", "fortnightly")
        .unwrap();

    let err = service.get_day_note("2024-03-15", None).unwrap_err();
    assert!(matches!(
        err,
        CalendarError::Configuration { ref name, ref value }
            if name == "calendarType" && value == "fortnightly"
    ));
}

#[test]
fn malformed_date_input_is_rejected() {
    let conn = setup();
    let service = service(&conn);

    let err = service.get_day_note("March 15th", None).unwrap_err();
    assert!(matches!(err, CalendarError::InvalidDate(_)));
}

#[test]
fn template_relations_are_attached_to_new_containers() {
    let conn = setup();
    let service = service(&conn);
    let notes = SqliteNoteRepository::new(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let root = service.get_root_calendar_note().unwrap();
    let template = notes
        .create_child_note(root_note_id(), &NoteDraft::with_title("Daily template"))
        .unwrap();
    attrs
        .create_relation(root.uuid, "dateTemplate", template.uuid)
        .unwrap();

    let day = service.get_day_note("2024-03-15", None).unwrap();
    assert_eq!(
        attrs.owned_relation_target(day.uuid, "template").unwrap(),
        Some(template.uuid)
    );

    // Containers created before the relation existed stay untouched.
    let year = service.get_year_note("2024-03-15", None).unwrap();
    assert_eq!(
        attrs.owned_relation_target(year.uuid, "template").unwrap(),
        None
    );
}

#[test]
fn weekly_calendar_builds_year_week_day_chain() {
    let conn = setup();
    let service = service(&conn);
    let notes = SqliteNoteRepository::new(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let root = service.get_root_calendar_note().unwrap();
    attrs
        .create_label(root.uuid, "calendarType", "weekly")
        .unwrap();

    let day = service.get_day_note("2024-03-15", None).unwrap();
    let week = notes.parent_notes(day.uuid).unwrap().remove(0);
    assert_eq!(
        attrs.owned_label_value(week.uuid, "weekNote").unwrap(),
        Some("2024WW11".to_string())
    );
    assert_eq!(week.title, "WW11");

    let year = notes.parent_notes(week.uuid).unwrap().remove(0);
    assert_eq!(
        attrs.owned_label_value(year.uuid, "yearNote").unwrap(),
        Some("2024".to_string())
    );
}

#[test]
fn month_resolution_under_weekly_calendar_falls_back_to_first_day() {
    let conn = setup();
    let service = service(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let root = service.get_root_calendar_note().unwrap();
    attrs
        .create_label(root.uuid, "calendarType", "weekly")
        .unwrap();

    let fallback = service.get_month_note("2024-03-15", None).unwrap();
    assert_eq!(
        attrs.owned_label_value(fallback.uuid, "dateNote").unwrap(),
        Some("2024-03-01".to_string())
    );
    assert_eq!(
        attrs.owned_label_value(fallback.uuid, "monthNote").unwrap(),
        None
    );
}

#[test]
fn protected_flag_is_inherited_only_with_protected_session() {
    let conn = setup();
    let notes = SqliteNoteRepository::new(&conn);

    let mut draft = NoteDraft::with_title("Private journal");
    draft.is_protected = true;
    draft.labels = vec![
        ("calendarRoot".to_string(), String::new()),
        ("sorted".to_string(), String::new()),
    ];
    notes.create_child_note(root_note_id(), &draft).unwrap();

    let unprotected_session = CalendarService::new(&conn, SessionContext::default());
    let day = unprotected_session.get_day_note("2024-03-15", None).unwrap();
    assert!(!day.is_protected);

    let protected_session = CalendarService::new(
        &conn,
        SessionContext {
            scope: WorkspaceScope::Global,
            protected_content_available: true,
        },
    );
    // A different year keeps the two ancestor chains disjoint.
    let other_day = protected_session.get_day_note("2025-07-01", None).unwrap();
    assert!(other_day.is_protected);
}

#[test]
fn today_note_carries_todays_canonical_label() {
    let conn = setup();
    let service = service(&conn);
    let attrs = SqliteAttributeRepository::new(&conn);

    let today = service.get_today_note(None).unwrap();
    let label = attrs
        .owned_label_value(today.uuid, "dateNote")
        .unwrap()
        .unwrap();
    assert_eq!(label.len(), 10);
    let resolved_again = service.get_day_note(&label, None).unwrap();
    assert_eq!(resolved_again.uuid, today.uuid);
}
