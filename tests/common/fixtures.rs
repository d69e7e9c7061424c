//! Static fixtures used across harnesses.
//!
//! `LEGACY_STORE` is a store snapshot in the shape the browser surfaces write:
//! camelCase keys, `null` for unset filters, one record predating the
//! `isCustomColor` field, and one whose flags, category and color were stored
//! as `null`.

use chrono::NaiveDate;
use sift_core::{MemoryStore, SearchRepository, StoreMap};
use std::sync::Arc;

/// Pinned "today" for sliding-window resolution.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date")
}

pub const LEGACY_STORE: &str = r##"{
  "savedSearches": [
    {
      "id": "search_1705312800000_k3j9x0a1b",
      "name": "AI from verified accounts",
      "query": "\"AI technology\" min_faves:100 filter:verified lang:en",
      "filters": {
        "keywords": "AI technology",
        "minFaves": 100,
        "maxFaves": null,
        "sinceDate": null,
        "slidingWindow": null,
        "fromUser": null,
        "verified": true,
        "includeReplies": null,
        "lang": "en"
      },
      "category": "Tech",
      "color": "#3b82f6",
      "isCustomColor": false,
      "createdAt": "2024-01-15T10:00:00.000Z",
      "useCount": 4,
      "lastUsed": "2024-02-01T08:30:00.000Z"
    },
    {
      "id": "search_1705312900000_p0q8r7s6t",
      "name": "Weekly rust releases",
      "query": "rust release since:2024-01-08 until:2024-01-15",
      "filters": {
        "keywords": "rust release",
        "slidingWindow": "1w",
        "includeRetweets": false
      },
      "category": "News",
      "color": "#ff00ff",
      "isCustomColor": true,
      "createdAt": "2024-01-15T10:01:40.000Z",
      "useCount": 0,
      "lastUsed": null,
      "isTemplate": true,
      "description": "release announcements"
    },
    {
      "id": "search_1705000000000_old000000",
      "name": "Pre-color record",
      "query": "from:rustlang",
      "filters": { "fromUser": "rustlang" },
      "category": "News",
      "createdAt": "2024-01-11T19:06:40.000Z"
    },
    {
      "id": "search_1704000000000_nul000000",
      "name": "Half-filled form",
      "query": "from:ferris",
      "filters": {
        "keywords": null,
        "fromUser": "ferris",
        "verified": null,
        "hasLinks": null,
        "quoteOnly": null,
        "includeReplies": null
      },
      "category": null,
      "color": null,
      "isCustomColor": null,
      "createdAt": "2023-12-31T05:20:00.000Z",
      "useCount": null,
      "lastUsed": null
    }
  ],
  "categories": ["Tech", "News", "Personal", "Research", "Uncategorized"],
  "categoryColors": {
    "Tech": "#3b82f6",
    "News": "#ef4444",
    "Personal": "#10b981",
    "Research": "#8b5cf6",
    "Uncategorized": "#6b7280"
  },
  "settings": { "theme": "dark" }
}"##;

pub fn legacy_items() -> StoreMap {
    serde_json::from_str(LEGACY_STORE).expect("legacy fixture is a JSON object")
}

/// A repository seeded with [`LEGACY_STORE`].
pub fn legacy_repo() -> (SearchRepository, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_items(legacy_items()));
    (SearchRepository::new(store.clone()), store)
}
