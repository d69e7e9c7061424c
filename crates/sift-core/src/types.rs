//! Core types for sift-core.
//!
//! This module defines the data structures shared by the query compiler and
//! the repository: the structured [`FilterSpec`], the persisted
//! [`SavedSearch`], category results, and the settings blob. Field names
//! serialize in camelCase so records written by the extension surfaces
//! round-trip unchanged.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category every search falls back to. Always present, never deletable.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Color used for categories without an entry in the color map.
pub const DEFAULT_COLOR: &str = "#6b7280";

/// Category list returned when nothing has been stored yet.
pub const DEFAULT_CATEGORIES: &[&str] = &["Tech", "News", "Personal", "Research", UNCATEGORIZED];

/// Category colors returned when nothing has been stored yet.
pub const DEFAULT_CATEGORY_COLORS: &[(&str, &str)] = &[
    ("Tech", "#3b82f6"),
    ("News", "#ef4444"),
    ("Personal", "#10b981"),
    ("Research", "#8b5cf6"),
    (UNCATEGORIZED, DEFAULT_COLOR),
];

// ---------------------------------------------------------------------------
// Sliding window
// ---------------------------------------------------------------------------

/// A relative date range stored as a marker and resolved to concrete dates
/// every time the search is displayed or applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlidingWindow {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1w")]
    Week,
    #[serde(rename = "1m")]
    Month,
}

impl SlidingWindow {
    /// Resolve to `(since, until)` relative to `today`.
    ///
    /// A month back from a day that does not exist in the previous month
    /// clamps to that month's last day (March 31 resolves to February 28/29).
    pub fn resolve(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let since = match self {
            SlidingWindow::Day => Some(today),
            SlidingWindow::Week => today.checked_sub_days(Days::new(7)),
            SlidingWindow::Month => today.checked_sub_months(Months::new(1)),
        };
        (since.unwrap_or(today), today)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlidingWindow::Day => "1d",
            SlidingWindow::Week => "1w",
            SlidingWindow::Month => "1m",
        }
    }
}

impl std::fmt::Display for SlidingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SlidingWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(SlidingWindow::Day),
            "1w" => Ok(SlidingWindow::Week),
            "1m" => Ok(SlidingWindow::Month),
            other => Err(format!("unknown sliding window: {other} (expected 1d, 1w or 1m)")),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// Structured search constraints compiled into a query string by
/// [`compile`](crate::query::compile).
///
/// Every field is optional. `None`, `false` and empty strings mean "no
/// constraint", and a stored `null` reads as the field's default.
/// `include_replies` / `include_retweets` are tri-state: `Some(true)`
/// includes, `Some(false)` excludes, `None` leaves it open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: String,

    pub min_faves: Option<u64>,
    pub max_faves: Option<u64>,
    pub min_retweets: Option<u64>,
    pub max_retweets: Option<u64>,
    pub min_replies: Option<u64>,
    pub max_replies: Option<u64>,

    pub since_date: Option<NaiveDate>,
    pub until_date: Option<NaiveDate>,
    /// Not compiled directly; see [`FilterSpec::resolved`].
    pub sliding_window: Option<SlidingWindow>,

    pub from_user: Option<String>,
    pub to_user: Option<String>,
    pub mentions_user: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub verified: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub blue_verified: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub follows: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_media: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_images: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_videos: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_links: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub quote_only: bool,

    pub include_replies: Option<bool>,
    pub include_retweets: Option<bool>,

    pub near: Option<String>,
    pub within: Option<String>,
    pub geocode: Option<String>,
    pub lang: Option<String>,
}

impl FilterSpec {
    /// True when the filter carries a sliding window and its compiled query
    /// therefore changes from day to day.
    pub fn is_dynamic(&self) -> bool {
        self.sliding_window.is_some()
    }

    /// Copy of this filter with the sliding window (if any) written into
    /// `since_date` / `until_date` relative to `today`.
    pub fn resolved(&self, today: NaiveDate) -> FilterSpec {
        let mut resolved = self.clone();
        if let Some(window) = self.sliding_window {
            let (since, until) = window.resolve(today);
            resolved.since_date = Some(since);
            resolved.until_date = Some(until);
        }
        resolved
    }
}

// ---------------------------------------------------------------------------
// Saved searches
// ---------------------------------------------------------------------------

/// A named, categorized search persisted under the `savedSearches` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    /// Query compiled at save time. Stale for sliding-window searches; use
    /// [`SavedSearch::display_query`] to render.
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: FilterSpec,
    #[serde(default = "default_category", deserialize_with = "null_as_category")]
    pub category: String,
    #[serde(default = "default_color", deserialize_with = "null_as_color")]
    pub color: String,
    /// Set when `color` was chosen explicitly rather than inherited from the
    /// category.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_custom_color: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub use_count: u64,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

// Stored records may carry `null` where a value was never set.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_category))
}

fn null_as_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_color))
}

/// Input to [`SearchRepository::save_search`](crate::repository::SearchRepository::save_search).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSearch {
    pub name: String,
    pub query: String,
    pub filters: FilterSpec,
    /// Defaults to [`UNCATEGORIZED`].
    pub category: Option<String>,
    /// An explicit color marks the search as custom-colored.
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Partial update for a saved search. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchUpdate {
    pub name: Option<String>,
    pub query: Option<String>,
    pub filters: Option<FilterSpec>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub is_custom_color: Option<bool>,
    pub is_template: Option<bool>,
    pub description: Option<String>,
}

impl SearchUpdate {
    /// Shallow-merge the set fields into `search`.
    pub fn apply_to(self, search: &mut SavedSearch) {
        if let Some(name) = self.name {
            search.name = name;
        }
        if let Some(query) = self.query {
            search.query = query;
        }
        if let Some(filters) = self.filters {
            search.filters = filters;
        }
        if let Some(category) = self.category {
            search.category = category;
        }
        if let Some(color) = self.color {
            search.color = color;
        }
        if let Some(is_custom_color) = self.is_custom_color {
            search.is_custom_color = is_custom_color;
        }
        if let Some(is_template) = self.is_template {
            search.is_template = Some(is_template);
        }
        if let Some(description) = self.description {
            search.description = Some(description);
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutcome {
    pub renamed: bool,
    pub searches_updated: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub searches_moved: usize,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// User preferences stored under the `settings` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub show_sidebar: bool,
    pub default_view: String,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            default_view: "builder".to_string(),
            theme: "light".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub show_sidebar: Option<bool>,
    pub default_view: Option<String>,
    pub theme: Option<String>,
}

impl SettingsUpdate {
    pub fn apply_to(self, settings: &mut Settings) {
        if let Some(show_sidebar) = self.show_sidebar {
            settings.show_sidebar = show_sidebar;
        }
        if let Some(default_view) = self.default_view {
            settings.default_view = default_view;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
