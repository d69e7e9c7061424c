//! Domain-specific assertion macros for sift harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* repository or compiler invariant was violated.

// ---------------------------------------------------------------------------
// Ordering assertions
// ---------------------------------------------------------------------------

/// Assert that a list of saved searches has exactly the given ids, in order.
///
/// ```rust
/// assert_order!(repo.get_saved_searches().await?, [&b.id, &a.id]);
/// ```
#[macro_export]
macro_rules! assert_order {
    ($searches:expr, [$($id:expr),* $(,)?]) => {{
        let searches: &[sift_core::SavedSearch] = &$searches;
        let actual: Vec<&str> = searches.iter().map(|s| s.id.as_str()).collect();
        let expected: Vec<&str> = vec![$(AsRef::<str>::as_ref($id)),*];
        pretty_assertions::assert_eq!(
            actual,
            expected,
            "assert_order! failed: stored display order differs"
        );
    }};
}

// ---------------------------------------------------------------------------
// Error assertions
// ---------------------------------------------------------------------------

/// Assert that a repository result is a validation error with `message`.
///
/// ```rust
/// assert_validation!(repo.create_category(" ", None).await, "Category name cannot be empty");
/// ```
#[macro_export]
macro_rules! assert_validation {
    ($result:expr, $message:expr) => {{
        match $result {
            Err(sift_core::RepositoryError::Validation(actual)) => {
                pretty_assertions::assert_eq!(
                    actual.as_str(),
                    $message,
                    "assert_validation! failed: wrong message"
                );
            }
            Err(other) => {
                panic!("assert_validation! failed: expected validation error, got {other:?}")
            }
            Ok(value) => {
                panic!("assert_validation! failed: expected {:?}, got Ok({value:?})", $message)
            }
        }
    }};
}

// ---------------------------------------------------------------------------
// Query assertions
// ---------------------------------------------------------------------------

/// Assert that every token in `expected` appears in `query`, in that order.
pub fn assert_tokens_in_order(query: &str, expected: &[&str]) {
    let tokens: Vec<&str> = query.split(' ').collect();
    let mut cursor = 0;
    for token in expected {
        match tokens[cursor..].iter().position(|t| t == token) {
            Some(offset) => cursor += offset + 1,
            None => panic!(
                "assert_tokens_in_order failed: {token:?} missing or out of order.\n  \
                 query:    {query:?}\n  expected: {expected:?}"
            ),
        }
    }
}
