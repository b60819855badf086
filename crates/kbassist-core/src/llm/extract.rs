//! Locating JSON inside free-form model replies
//!
//! Models wrap their JSON in prose or markdown fences despite instructions,
//! so every parser here slices the reply before handing it to serde.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ID_ARRAY: Regex = Regex::new(r"\[[\d,\s]+\]").unwrap();
    static ref ANY_ARRAY: Regex = Regex::new(r"\[.*\]").unwrap();
}

/// Slice from the first `{` to the last `}`
pub fn json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// First bracketed list of integers, e.g. `[3, 1, 5]`
pub fn id_array(response: &str) -> Option<&str> {
    ID_ARRAY.find(response).map(|m| m.as_str())
}

/// Widest bracketed span on a single line
pub fn json_array(response: &str) -> Option<&str> {
    ANY_ARRAY.find(response).map(|m| m.as_str())
}
