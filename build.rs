//! Cargo build script: generates static message descriptors from the signal database.

// Re-export the core module from src/core.rs so build_core can reuse it
#[path = "src/core.rs"]
mod core;

mod build_core;
use crate::build_core::{
    conf::*, domain::SignalDatabase, errors::BuildError, gen_messages::run_messages_gen,
};

use std::fs;
use std::path::PathBuf;

// The signal layouts (which bits of which message carry the brake pedal, the
// steering torque, the rolling counter...) live in a JSON database, in the spirit
// of a DBC file. This script validates that database and turns it into
// `MessageDescriptor` statics consumed by the codec engine at run time, so the
// firmware never parses anything while driving.

//==================================================================================MAIN
fn main() -> Result<(), BuildError> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=build_core");
    println!("cargo:rerun-if-env-changed={MESSAGES_DB_ENV}");

    // 1. Locate the signal database.
    // Priority order:
    //   1. CAN_GATEKEEPER_MESSAGES_PATH environment variable
    //   2. Default database shipped with the crate
    let default_path = PathBuf::from(MESSAGES_DB_PATH);
    let db_path = match std::env::var(MESSAGES_DB_ENV).ok().map(PathBuf::from) {
        Some(path) if path.exists() => {
            println!("cargo:warning=Using custom signal database from {:?}", path);
            println!("cargo:rerun-if-changed={}", path.display());
            path
        }
        Some(path) => {
            println!(
                "cargo:warning=Custom signal database specified but file not found: {:?}",
                path
            );
            println!("cargo:warning=Falling back to the default signal database");
            default_path
        }
        None => default_path,
    };

    // 2. Parse it.
    let db_string = fs::read_to_string(&db_path).map_err(|e| BuildError::ReadFile {
        path: db_path.clone(),
        source: e,
    })?;
    let db: SignalDatabase = serde_json::from_str(&db_string)?;

    // 3. Validate and generate descriptors.
    let buffer_messages_code = run_messages_gen(&db)?;

    // 4. Write the generated code into `OUT_DIR`.
    // `src/protocol/messages/mod.rs` pulls it in with `include!`.
    let out_dir_str = std::env::var("OUT_DIR").map_err(|e| BuildError::OutDirErr { source: e })?;
    let messages_file_path = PathBuf::from(out_dir_str).join(OUT_DIR_MESSAGES_FILE_NAME);

    fs::write(&messages_file_path, &buffer_messages_code).map_err(|e| BuildError::WriteFile {
        path: messages_file_path,
        source: e,
    })?;

    Ok(())
}
