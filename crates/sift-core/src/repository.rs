//! Repository: saved searches, categories, category colors and settings on
//! top of a [`KeyValueStore`].
//!
//! Every public method is one read-compute-write round trip: read the keys it
//! needs, build the new collections in memory, write them back in a single
//! `set`. Nothing is cached between calls, so several repositories (one per
//! extension surface, say) can share one store.
//!
//! There is no lock across the round trip. Two repositories writing the same
//! key at the same time race, and the later write wins.
//!
//! Categories keep referential integrity with their searches:
//!
//! - renaming a category renames it on every member search and moves its color;
//! - deleting one moves its members to [`UNCATEGORIZED`], recoloring only the
//!   members whose color was inherited.

use crate::error::{RepositoryError, Result, StoreError};
use crate::id::generate_id;
use crate::query::compile;
use crate::store::{KeyValueStore, StoreMap};
use crate::types::{
    Category, DeleteOutcome, NewSearch, RenameOutcome, SavedSearch, SearchUpdate, Settings,
    SettingsUpdate, DEFAULT_CATEGORIES, DEFAULT_CATEGORY_COLORS, DEFAULT_COLOR, UNCATEGORIZED,
};
use chrono::{NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const SEARCHES_KEY: &str = "savedSearches";
pub const CATEGORIES_KEY: &str = "categories";
pub const COLORS_KEY: &str = "categoryColors";
pub const SETTINGS_KEY: &str = "settings";

/// Category name → `#RRGGBB`.
pub type CategoryColors = BTreeMap<String, String>;

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_colors() -> CategoryColors {
    DEFAULT_CATEGORY_COLORS
        .iter()
        .map(|(name, color)| (name.to_string(), color.to_string()))
        .collect()
}

fn color_for(colors: &CategoryColors, category: &str) -> String {
    colors.get(category).cloned().unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

/// Recolor the inherited-color members of `category`, returning how many
/// changed.
fn recolor_members(searches: &mut [SavedSearch], category: &str, color: &str) -> usize {
    let mut changed = 0;
    for search in searches
        .iter_mut()
        .filter(|s| s.category == category && !s.is_custom_color && s.color != color)
    {
        search.color = color.to_string();
        changed += 1;
    }
    changed
}

/// Remove `key` from a read result and decode it. A missing or `null` value
/// yields `None`.
fn take<T: DeserializeOwned>(
    items: &mut StoreMap,
    key: &str,
) -> std::result::Result<Option<T>, StoreError> {
    match items.remove(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn put<T: Serialize>(
    items: &mut StoreMap,
    key: &str,
    value: &T,
) -> std::result::Result<(), StoreError> {
    items.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}

impl SavedSearch {
    /// The query to show or run for this search on `today`.
    ///
    /// Sliding-window searches are recompiled with fresh dates; everything
    /// else returns the stored query.
    pub fn display_query(&self, today: NaiveDate) -> String {
        if self.filters.is_dynamic() {
            compile(&self.filters.resolved(today))
        } else {
            self.query.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// SearchRepository
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SearchRepository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SearchRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRepository").finish_non_exhaustive()
    }
}

impl SearchRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read(&self, keys: &[&str]) -> Result<StoreMap> {
        Ok(self.store.get(keys).await?)
    }

    async fn write(&self, items: StoreMap) -> Result<()> {
        tracing::debug!(keys = ?items.keys().collect::<Vec<_>>(), "repository: write");
        Ok(self.store.set(items).await?)
    }

    async fn write_searches(&self, searches: &[SavedSearch]) -> Result<()> {
        let mut items = StoreMap::new();
        put(&mut items, SEARCHES_KEY, &searches)?;
        self.write(items).await
    }

    async fn load_searches(&self) -> Result<Vec<SavedSearch>> {
        let mut items = self.read(&[SEARCHES_KEY]).await?;
        Ok(take(&mut items, SEARCHES_KEY)?.unwrap_or_default())
    }

    // ── Saved searches ───────────────────────────────────────────────────────

    /// All saved searches in display order.
    pub async fn get_saved_searches(&self) -> Result<Vec<SavedSearch>> {
        self.load_searches().await
    }

    pub async fn get_search(&self, id: &str) -> Result<Option<SavedSearch>> {
        Ok(self.load_searches().await?.into_iter().find(|s| s.id == id))
    }

    pub async fn get_searches_in_category(&self, category: &str) -> Result<Vec<SavedSearch>> {
        let searches = self.load_searches().await?;
        Ok(searches.into_iter().filter(|s| s.category == category).collect())
    }

    /// Persist a new search at the front of the list.
    ///
    /// An explicit color marks the search custom-colored; otherwise it takes
    /// its category's current color.
    pub async fn save_search(&self, input: NewSearch) -> Result<SavedSearch> {
        let mut items = self.read(&[SEARCHES_KEY, COLORS_KEY]).await?;
        let mut searches: Vec<SavedSearch> = take(&mut items, SEARCHES_KEY)?.unwrap_or_default();
        let colors: CategoryColors = take(&mut items, COLORS_KEY)?.unwrap_or_else(default_colors);

        let category = input
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let (color, is_custom_color) = match input.color.filter(|c| !c.is_empty()) {
            Some(color) => (color, true),
            None => (color_for(&colors, &category), false),
        };

        let search = SavedSearch {
            id: generate_id(),
            name: input.name,
            query: input.query,
            filters: input.filters,
            category,
            color,
            is_custom_color,
            created_at: Utc::now(),
            use_count: 0,
            last_used: None,
            is_template: None,
            description: input.description.filter(|d| !d.is_empty()),
        };
        searches.insert(0, search.clone());
        self.write_searches(&searches).await?;

        tracing::debug!(id = %search.id, category = %search.category, "repository: search saved");
        Ok(search)
    }

    /// Shallow-merge `update` into the search with `id`. `None` if no such
    /// search exists.
    pub async fn update_search(
        &self,
        id: &str,
        update: SearchUpdate,
    ) -> Result<Option<SavedSearch>> {
        let mut searches = self.load_searches().await?;
        let Some(search) = searches.iter_mut().find(|s| s.id == id) else {
            tracing::debug!(id, "repository: update of unknown search");
            return Ok(None);
        };
        update.apply_to(search);
        let updated = search.clone();
        self.write_searches(&searches).await?;
        Ok(Some(updated))
    }

    /// Remove the search with `id`. Always `true`; deleting an unknown id is a
    /// no-op.
    pub async fn delete_search(&self, id: &str) -> Result<bool> {
        let mut searches = self.load_searches().await?;
        let before = searches.len();
        searches.retain(|s| s.id != id);
        if searches.len() != before {
            self.write_searches(&searches).await?;
            tracing::debug!(id, "repository: search deleted");
        }
        Ok(true)
    }

    pub async fn increment_use_count(&self, id: &str) -> Result<Option<SavedSearch>> {
        let mut searches = self.load_searches().await?;
        let Some(search) = searches.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        search.use_count += 1;
        search.last_used = Some(Utc::now());
        let updated = search.clone();
        self.write_searches(&searches).await?;
        Ok(Some(updated))
    }

    /// Record a use of the search and return the query to run on `today`.
    pub async fn apply_search(&self, id: &str, today: NaiveDate) -> Result<Option<String>> {
        let search = self.increment_use_count(id).await?;
        Ok(search.map(|s| s.display_query(today)))
    }

    /// Rewrite the stored order to `order`.
    ///
    /// `order` decides both sequence and membership: ids not in storage are
    /// skipped, and stored searches whose id is missing from `order` are
    /// dropped. Callers must pass the full surviving id set.
    pub async fn reorder_searches<S: AsRef<str>>(&self, order: &[S]) -> Result<Vec<SavedSearch>> {
        let searches = self.load_searches().await?;
        let mut by_id: HashMap<String, SavedSearch> =
            searches.into_iter().map(|s| (s.id.clone(), s)).collect();

        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            match by_id.remove(id.as_ref()) {
                Some(search) => reordered.push(search),
                None => tracing::debug!(id = id.as_ref(), "repository: reorder skipped unknown id"),
            }
        }
        if !by_id.is_empty() {
            tracing::warn!(
                dropped = by_id.len(),
                "repository: reorder dropped searches missing from order"
            );
        }

        self.write_searches(&reordered).await?;
        Ok(reordered)
    }

    // ── Categories ───────────────────────────────────────────────────────────

    pub async fn get_categories(&self) -> Result<Vec<String>> {
        let mut items = self.read(&[CATEGORIES_KEY]).await?;
        Ok(take(&mut items, CATEGORIES_KEY)?.unwrap_or_else(default_categories))
    }

    /// Create a category with `color` (default `#6b7280`). The name is trimmed
    /// and must be non-empty and not already taken.
    pub async fn create_category(&self, name: &str, color: Option<&str>) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepositoryError::validation("Category name cannot be empty"));
        }

        let mut items = self.read(&[CATEGORIES_KEY, COLORS_KEY]).await?;
        let mut categories: Vec<String> =
            take(&mut items, CATEGORIES_KEY)?.unwrap_or_else(default_categories);
        let mut colors: CategoryColors =
            take(&mut items, COLORS_KEY)?.unwrap_or_else(default_colors);

        if categories.iter().any(|c| c == name) {
            return Err(RepositoryError::validation("Category already exists"));
        }

        let color = color.unwrap_or(DEFAULT_COLOR).to_string();
        categories.push(name.to_string());
        colors.insert(name.to_string(), color.clone());

        let mut changes = StoreMap::new();
        put(&mut changes, CATEGORIES_KEY, &categories)?;
        put(&mut changes, COLORS_KEY, &colors)?;
        self.write(changes).await?;

        tracing::info!(category = name, %color, "repository: category created");
        Ok(Category { name: name.to_string(), color })
    }

    /// Rename `old_name` to `new_name` (trimmed), carrying its color and every
    /// member search along.
    pub async fn rename_category(&self, old_name: &str, new_name: &str) -> Result<RenameOutcome> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(RepositoryError::validation("Category name cannot be empty"));
        }
        if old_name == new_name {
            return Ok(RenameOutcome { renamed: false, searches_updated: 0 });
        }
        if old_name == UNCATEGORIZED {
            return Err(RepositoryError::validation("Cannot rename Uncategorized category"));
        }

        let mut items = self.read(&[CATEGORIES_KEY, COLORS_KEY, SEARCHES_KEY]).await?;
        let mut categories: Vec<String> =
            take(&mut items, CATEGORIES_KEY)?.unwrap_or_else(default_categories);
        let mut colors: CategoryColors =
            take(&mut items, COLORS_KEY)?.unwrap_or_else(default_colors);
        let mut searches: Vec<SavedSearch> = take(&mut items, SEARCHES_KEY)?.unwrap_or_default();

        let Some(position) = categories.iter().position(|c| c == old_name) else {
            return Err(RepositoryError::validation("Category does not exist"));
        };
        if categories.iter().any(|c| c == new_name) {
            return Err(RepositoryError::validation("Category already exists"));
        }

        categories[position] = new_name.to_string();
        if let Some(color) = colors.remove(old_name) {
            colors.insert(new_name.to_string(), color);
        }

        let mut searches_updated = 0;
        for search in searches.iter_mut().filter(|s| s.category == old_name) {
            search.category = new_name.to_string();
            searches_updated += 1;
        }

        let mut changes = StoreMap::new();
        put(&mut changes, CATEGORIES_KEY, &categories)?;
        put(&mut changes, COLORS_KEY, &colors)?;
        put(&mut changes, SEARCHES_KEY, &searches)?;
        self.write(changes).await?;

        tracing::info!(
            from = old_name,
            to = new_name,
            searches_updated,
            "repository: category renamed"
        );
        Ok(RenameOutcome { renamed: true, searches_updated })
    }

    /// Delete `name`, moving its searches to [`UNCATEGORIZED`].
    ///
    /// Moved searches with an inherited color take Uncategorized's current
    /// color; custom colors are kept. Unknown names report `deleted: false`.
    pub async fn delete_category(&self, name: &str) -> Result<DeleteOutcome> {
        if name == UNCATEGORIZED {
            return Err(RepositoryError::validation("Cannot delete Uncategorized category"));
        }

        let mut items = self.read(&[CATEGORIES_KEY, COLORS_KEY, SEARCHES_KEY]).await?;
        let mut categories: Vec<String> =
            take(&mut items, CATEGORIES_KEY)?.unwrap_or_else(default_categories);
        let mut colors: CategoryColors =
            take(&mut items, COLORS_KEY)?.unwrap_or_else(default_colors);
        let mut searches: Vec<SavedSearch> = take(&mut items, SEARCHES_KEY)?.unwrap_or_default();

        let Some(position) = categories.iter().position(|c| c == name) else {
            return Ok(DeleteOutcome { deleted: false, searches_moved: 0 });
        };
        categories.remove(position);
        colors.remove(name);
        if !categories.iter().any(|c| c == UNCATEGORIZED) {
            categories.push(UNCATEGORIZED.to_string());
        }

        let fallback = color_for(&colors, UNCATEGORIZED);
        let mut searches_moved = 0;
        for search in searches.iter_mut().filter(|s| s.category == name) {
            search.category = UNCATEGORIZED.to_string();
            if !search.is_custom_color {
                search.color = fallback.clone();
            }
            searches_moved += 1;
        }

        let mut changes = StoreMap::new();
        put(&mut changes, CATEGORIES_KEY, &categories)?;
        put(&mut changes, COLORS_KEY, &colors)?;
        put(&mut changes, SEARCHES_KEY, &searches)?;
        self.write(changes).await?;

        tracing::info!(category = name, searches_moved, "repository: category deleted");
        Ok(DeleteOutcome { deleted: true, searches_moved })
    }

    // ── Category colors ──────────────────────────────────────────────────────

    pub async fn get_category_colors(&self) -> Result<CategoryColors> {
        let mut items = self.read(&[COLORS_KEY]).await?;
        Ok(take(&mut items, COLORS_KEY)?.unwrap_or_else(default_colors))
    }

    /// Set the default color for `name`. Existing searches are not touched;
    /// see [`update_searches_in_category`](Self::update_searches_in_category).
    pub async fn set_category_color(&self, name: &str, color: &str) -> Result<CategoryColors> {
        let mut colors = self.get_category_colors().await?;
        colors.insert(name.to_string(), color.to_string());

        let mut changes = StoreMap::new();
        put(&mut changes, COLORS_KEY, &colors)?;
        self.write(changes).await?;
        Ok(colors)
    }

    /// Color for `name`, or `#6b7280` for unknown or absent names.
    pub async fn get_category_color(&self, name: Option<&str>) -> Result<String> {
        let Some(name) = name else {
            return Ok(DEFAULT_COLOR.to_string());
        };
        Ok(color_for(&self.get_category_colors().await?, name))
    }

    /// Recolor every inherited-color member of `category`. Returns whether any
    /// search changed.
    pub async fn update_searches_in_category(&self, category: &str, color: &str) -> Result<bool> {
        let mut searches = self.load_searches().await?;
        let changed = recolor_members(&mut searches, category, color);
        if changed == 0 {
            return Ok(false);
        }
        self.write_searches(&searches).await?;
        tracing::debug!(category, changed, "repository: category color propagated");
        Ok(true)
    }

    /// Set `name`'s color and recolor its inherited-color members in one
    /// write. Returns whether any search changed.
    pub async fn recolor_category(&self, name: &str, color: &str) -> Result<bool> {
        let mut items = self.read(&[COLORS_KEY, SEARCHES_KEY]).await?;
        let mut colors: CategoryColors =
            take(&mut items, COLORS_KEY)?.unwrap_or_else(default_colors);
        let mut searches: Vec<SavedSearch> = take(&mut items, SEARCHES_KEY)?.unwrap_or_default();

        colors.insert(name.to_string(), color.to_string());
        let changed = recolor_members(&mut searches, name, color);

        let mut changes = StoreMap::new();
        put(&mut changes, COLORS_KEY, &colors)?;
        if changed > 0 {
            put(&mut changes, SEARCHES_KEY, &searches)?;
        }
        self.write(changes).await?;

        tracing::info!(category = name, %color, changed, "repository: category recolored");
        Ok(changed > 0)
    }

    // ── Usage counts ─────────────────────────────────────────────────────────

    pub async fn get_category_usage_count(&self, name: &str) -> Result<usize> {
        let searches = self.load_searches().await?;
        Ok(searches.iter().filter(|s| s.category == name).count())
    }

    /// Search count per category. Every known category is present, including
    /// empty ones.
    pub async fn get_all_category_usage_counts(&self) -> Result<BTreeMap<String, usize>> {
        let mut items = self.read(&[CATEGORIES_KEY, SEARCHES_KEY]).await?;
        let categories: Vec<String> =
            take(&mut items, CATEGORIES_KEY)?.unwrap_or_else(default_categories);
        let searches: Vec<SavedSearch> = take(&mut items, SEARCHES_KEY)?.unwrap_or_default();

        let mut counts: BTreeMap<String, usize> = categories.into_iter().map(|c| (c, 0)).collect();
        for search in &searches {
            *counts.entry(search.category.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    // ── Settings ─────────────────────────────────────────────────────────────

    pub async fn get_settings(&self) -> Result<Settings> {
        let mut items = self.read(&[SETTINGS_KEY]).await?;
        Ok(take(&mut items, SETTINGS_KEY)?.unwrap_or_default())
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        let mut settings = self.get_settings().await?;
        update.apply_to(&mut settings);

        let mut changes = StoreMap::new();
        put(&mut changes, SETTINGS_KEY, &settings)?;
        self.write(changes).await?;
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
