//! Name transformation helpers used to generate idiomatic Rust code.
//==================================================================================NAME_HELPERS
/// Convert a database name (`STEERING_CONTROL`, `Steering Control`, `steeringControl`)
/// into a `SCREAMING_SNAKE_CASE` identifier usable for statics and constants.
pub(crate) fn to_const_name(name: &str) -> String {
    let mut buffer = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                buffer.push('_');
            }
            buffer.push(c.to_ascii_uppercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else if !buffer.ends_with('_') && !buffer.is_empty() {
            buffer.push('_');
            prev_lower = false;
        }
    }

    while buffer.ends_with('_') {
        buffer.pop();
    }

    // Identifiers cannot start with a digit.
    if buffer.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        buffer.insert_str(0, "MSG_");
    }
    buffer
}
