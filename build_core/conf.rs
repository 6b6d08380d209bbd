//! Paths and constants used during build-time code generation.
//==================================================================================CONF
/// Signal database shipped with the crate.
pub(crate) const MESSAGES_DB_PATH: &str = "build_core/var/honda_messages.json";
/// Environment variable pointing to an alternate signal database.
pub(crate) const MESSAGES_DB_ENV: &str = "CAN_GATEKEEPER_MESSAGES_PATH";
/// Generated descriptor file name (written to `OUT_DIR`).
pub(crate) const OUT_DIR_MESSAGES_FILE_NAME: &str = "generated_messages.rs";
/// Classic CAN payload limit, in bytes.
pub(crate) const MAX_MESSAGE_LENGTH: u8 = 8;
