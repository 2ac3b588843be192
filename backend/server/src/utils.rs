use chrono::{DateTime, Utc};
use rand::{Rng, thread_rng};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// `contact_<unix millis>_<9 base36 chars>`.
///
/// Unique with overwhelming probability, not guaranteed: two submissions in
/// the same millisecond rely on the random suffix alone.
pub fn new_submission_id(now: DateTime<Utc>) -> String {
    let mut rng = thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("contact_{}_{suffix}", now.timestamp_millis())
}

/// Escapes Redis glob metacharacters so `input` only matches itself.
pub fn glob_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '^' | '-') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
