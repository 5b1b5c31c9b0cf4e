//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `memoboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use memoboard_core::db::open_db_in_memory;

fn main() {
    println!("memoboard_core version={}", memoboard_core::core_version());
    match open_db_in_memory() {
        Ok(_) => println!("memoboard_core db=ok"),
        Err(err) => println!("memoboard_core db=error {err}"),
    }
}
