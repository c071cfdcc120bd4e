//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daybook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use daybook_core::db::open_db_in_memory;
use daybook_core::{CalendarService, SessionContext};

fn main() {
    // Resolving today's note against a throwaway in-memory store exercises
    // the whole root -> year -> month -> day path without touching disk.
    println!("daybook_core version={}", daybook_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("daybook_core store open failed: {err}");
            std::process::exit(1);
        }
    };

    let service = CalendarService::new(&conn, SessionContext::default());
    match service.get_today_note(None) {
        Ok(note) => println!("daybook_core today={} title={}", note.uuid, note.title),
        Err(err) => {
            eprintln!("daybook_core today resolution failed: {err}");
            std::process::exit(1);
        }
    }
}
