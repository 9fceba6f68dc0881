//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tutorpad_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use tutorpad_core::db::open_db_in_memory;
use tutorpad_core::{CommandService, SqliteRosterStore};

fn main() {
    println!("tutorpad_core version={}", tutorpad_core::core_version());

    match open_db_in_memory() {
        Ok(conn) => match SqliteRosterStore::try_new(&conn).map(CommandService::new) {
            Ok(Ok(service)) => {
                println!("roster students={}", service.roster().len());
            }
            Ok(Err(err)) | Err(err) => eprintln!("roster bootstrap failed: {err}"),
        },
        Err(err) => eprintln!("db bootstrap failed: {err}"),
    }
}
