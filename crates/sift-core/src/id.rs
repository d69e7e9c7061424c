//! Saved-search identifiers: `search_<unix-millis>_<9 base36 chars>`.
//!
//! The timestamp keeps ids roughly sortable; uniqueness comes from the random
//! suffix, so ids minted within the same millisecond (or under clock skew)
//! still differ.

use chrono::Utc;
use rand::Rng;

const ID_PREFIX: &str = "search";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{ID_PREFIX}_{}_{suffix}", Utc::now().timestamp_millis())
}
