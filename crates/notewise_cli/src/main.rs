//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notewise_core` linkage and
//!   schema bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use notewise_core::db::migrations::latest_version;
use notewise_core::db::open_db_in_memory;

fn main() {
    println!("notewise_core version={}", notewise_core::core_version());
    match open_db_in_memory() {
        Ok(_conn) => println!("notewise_core schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("notewise_core db bootstrap failed: {err}");
            std::process::exit(1);
        }
    }
}
