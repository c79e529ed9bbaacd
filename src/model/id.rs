use uuid::Uuid;

/// Generate a fresh entity ID: a random v4 UUID as 32 lowercase hex characters.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Length of the ID prefix shown in text output
pub const SHORT_ID_LEN: usize = 8;

/// Abbreviate an ID for display
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
