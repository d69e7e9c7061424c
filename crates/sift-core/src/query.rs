//! Query compiler. Turns a [`FilterSpec`] into the site's search syntax.
//!
//! Tokens are space-joined in a fixed order that never depends on which
//! fields are set or how the filter was built:
//!
//! ```text
//! keywords  min_faves -min_faves  min_retweets -min_retweets
//! min_replies -min_replies  since until  from to @mention
//! filter:verified filter:blue_verified filter:follows
//! filter:media filter:images filter:videos filter:links
//! [-]filter:replies [-]filter:retweets filter:quote
//! near:LOC within:DIST  geocode  lang
//! ```
//!
//! Upper bounds have no native operator and are written as a negated lower
//! bound (`max_faves = 50` becomes `-min_faves:50`).

use crate::types::{FilterSpec, SlidingWindow};
use chrono::NaiveDate;

/// Compile `filters` into a query string. Pure; unset fields add nothing and
/// an empty filter yields `""`.
///
/// `sliding_window` is ignored here. Resolve it first with
/// [`FilterSpec::resolved`] or [`QueryBuilder::build_resolved`].
pub fn compile(filters: &FilterSpec) -> String {
    let mut tokens: Vec<String> = Vec::new();

    if !filters.keywords.is_empty() {
        tokens.push(quote_keywords(&filters.keywords));
    }

    push_range(&mut tokens, "min_faves", filters.min_faves, filters.max_faves);
    push_range(&mut tokens, "min_retweets", filters.min_retweets, filters.max_retweets);
    push_range(&mut tokens, "min_replies", filters.min_replies, filters.max_replies);

    if let Some(since) = filters.since_date {
        tokens.push(format!("since:{}", since.format("%Y-%m-%d")));
    }
    if let Some(until) = filters.until_date {
        tokens.push(format!("until:{}", until.format("%Y-%m-%d")));
    }

    if let Some(user) = present(&filters.from_user) {
        tokens.push(format!("from:{user}"));
    }
    if let Some(user) = present(&filters.to_user) {
        tokens.push(format!("to:{user}"));
    }
    if let Some(user) = present(&filters.mentions_user) {
        tokens.push(format!("@{user}"));
    }

    let flags = [
        (filters.verified, "filter:verified"),
        (filters.blue_verified, "filter:blue_verified"),
        (filters.follows, "filter:follows"),
        (filters.has_media, "filter:media"),
        (filters.has_images, "filter:images"),
        (filters.has_videos, "filter:videos"),
        (filters.has_links, "filter:links"),
    ];
    tokens.extend(flags.iter().filter(|(on, _)| *on).map(|(_, token)| token.to_string()));

    push_tristate(&mut tokens, "filter:replies", filters.include_replies);
    push_tristate(&mut tokens, "filter:retweets", filters.include_retweets);

    if filters.quote_only {
        tokens.push("filter:quote".to_string());
    }

    // A radius without a location (or the reverse) is meaningless; both or nothing.
    if let (Some(near), Some(within)) = (present(&filters.near), present(&filters.within)) {
        tokens.push(format!("near:{near} within:{within}"));
    }
    if let Some(geocode) = present(&filters.geocode) {
        tokens.push(format!("geocode:{geocode}"));
    }
    if let Some(lang) = present(&filters.lang) {
        tokens.push(format!("lang:{lang}"));
    }

    tokens.join(" ")
}

/// Multi-word keywords become a phrase unless the caller already quoted them.
fn quote_keywords(keywords: &str) -> String {
    if keywords.contains(' ') && !keywords.starts_with('"') {
        format!("\"{keywords}\"")
    } else {
        keywords.to_string()
    }
}

fn push_range(tokens: &mut Vec<String>, operator: &str, min: Option<u64>, max: Option<u64>) {
    if let Some(min) = min {
        tokens.push(format!("{operator}:{min}"));
    }
    if let Some(max) = max {
        tokens.push(format!("-{operator}:{max}"));
    }
}

fn push_tristate(tokens: &mut Vec<String>, token: &str, include: Option<bool>) {
    match include {
        Some(true) => tokens.push(token.to_string()),
        Some(false) => tokens.push(format!("-{token}")),
        None => {}
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent accumulator over a [`FilterSpec`].
///
/// ```
/// use sift_core::query::QueryBuilder;
///
/// let query = QueryBuilder::new()
///     .with_keywords("AI technology")
///     .with_min_faves(100)
///     .with_verified(true)
///     .with_lang("en")
///     .build();
/// assert_eq!(query, "\"AI technology\" min_faves:100 filter:verified lang:en");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    filters: FilterSpec,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing filter, e.g. a saved search being edited.
    pub fn from_filters(filters: FilterSpec) -> Self {
        Self { filters }
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.filters.keywords = keywords.into();
        self
    }

    pub fn with_min_faves(mut self, n: u64) -> Self {
        self.filters.min_faves = Some(n);
        self
    }

    pub fn with_max_faves(mut self, n: u64) -> Self {
        self.filters.max_faves = Some(n);
        self
    }

    pub fn with_min_retweets(mut self, n: u64) -> Self {
        self.filters.min_retweets = Some(n);
        self
    }

    pub fn with_max_retweets(mut self, n: u64) -> Self {
        self.filters.max_retweets = Some(n);
        self
    }

    pub fn with_min_replies(mut self, n: u64) -> Self {
        self.filters.min_replies = Some(n);
        self
    }

    pub fn with_max_replies(mut self, n: u64) -> Self {
        self.filters.max_replies = Some(n);
        self
    }

    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.filters.since_date = Some(date);
        self
    }

    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.filters.until_date = Some(date);
        self
    }

    /// Store a sliding window marker. [`build`](Self::build) ignores it;
    /// [`build_resolved`](Self::build_resolved) turns it into dates.
    pub fn with_sliding_window(mut self, window: SlidingWindow) -> Self {
        self.filters.sliding_window = Some(window);
        self
    }

    pub fn with_from_user(mut self, user: impl Into<String>) -> Self {
        self.filters.from_user = Some(user.into());
        self
    }

    pub fn with_to_user(mut self, user: impl Into<String>) -> Self {
        self.filters.to_user = Some(user.into());
        self
    }

    pub fn with_mentions_user(mut self, user: impl Into<String>) -> Self {
        self.filters.mentions_user = Some(user.into());
        self
    }

    pub fn with_verified(mut self, on: bool) -> Self {
        self.filters.verified = on;
        self
    }

    pub fn with_blue_verified(mut self, on: bool) -> Self {
        self.filters.blue_verified = on;
        self
    }

    pub fn with_follows(mut self, on: bool) -> Self {
        self.filters.follows = on;
        self
    }

    pub fn with_media(mut self, on: bool) -> Self {
        self.filters.has_media = on;
        self
    }

    pub fn with_images(mut self, on: bool) -> Self {
        self.filters.has_images = on;
        self
    }

    pub fn with_videos(mut self, on: bool) -> Self {
        self.filters.has_videos = on;
        self
    }

    pub fn with_links(mut self, on: bool) -> Self {
        self.filters.has_links = on;
        self
    }

    /// `Some(false)` excludes replies, `None` removes the constraint.
    pub fn with_replies(mut self, include: Option<bool>) -> Self {
        self.filters.include_replies = include;
        self
    }

    /// `Some(false)` excludes retweets, `None` removes the constraint.
    pub fn with_retweets(mut self, include: Option<bool>) -> Self {
        self.filters.include_retweets = include;
        self
    }

    pub fn with_quote_only(mut self, on: bool) -> Self {
        self.filters.quote_only = on;
        self
    }

    pub fn with_near(mut self, location: impl Into<String>, radius: impl Into<String>) -> Self {
        self.filters.near = Some(location.into());
        self.filters.within = Some(radius.into());
        self
    }

    pub fn with_geocode(mut self, geocode: impl Into<String>) -> Self {
        self.filters.geocode = Some(geocode.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.filters.lang = Some(lang.into());
        self
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn into_filters(self) -> FilterSpec {
        self.filters
    }

    pub fn build(&self) -> String {
        compile(&self.filters)
    }

    /// Compile with any sliding window resolved against `today`.
    pub fn build_resolved(&self, today: NaiveDate) -> String {
        compile(&self.filters.resolved(today))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
