//! Command-line shell over [`sift_core`].
//!
//! Stands in for the extension's popup: every subcommand maps onto one
//! compiler or repository call and renders the result as text or JSON.
//! [`execute`] returns the rendered output instead of printing it so the
//! harnesses can drive it directly.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use serde::Serialize;
use sift_core::{
    compile, FilterSpec, NewSearch, SavedSearch, SearchRepository, Settings, SettingsUpdate,
    SlidingWindow, DEFAULT_COLOR,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sift", about = "Build, save and re-apply structured social-media searches")]
pub struct Cli {
    /// Write debug logs to /tmp/sift-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Store file to use instead of the configured one.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the query for a set of filters without saving it.
    Compile(FilterArgs),
    /// Compile and save a search.
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: Option<String>,
        /// Explicit color; the search then ignores its category's color.
        #[arg(long, value_parser = parse_hex_color)]
        color: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List saved searches in display order.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Record a use of a saved search and print its query.
    Apply { id: String },
    /// Delete a saved search.
    Delete { id: String },
    /// Rewrite the display order. Searches not listed are removed.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    #[command(subcommand)]
    Category(CategoryCommand),
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List categories with their colors and search counts.
    List,
    Create {
        name: String,
        #[arg(long, value_parser = parse_hex_color)]
        color: Option<String>,
    },
    Rename { old: String, new: String },
    Delete { name: String },
    /// Change a category's color and recolor its inherited-color searches.
    Color {
        name: String,
        #[arg(value_parser = parse_hex_color)]
        color: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        show_sidebar: Option<bool>,
        #[arg(long)]
        default_view: Option<String>,
        #[arg(long)]
        theme: Option<String>,
    },
}

/// Filter flags shared by `compile` and `save`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long, default_value = "")]
    pub keywords: String,
    #[arg(long)]
    pub min_faves: Option<u64>,
    #[arg(long)]
    pub max_faves: Option<u64>,
    #[arg(long)]
    pub min_retweets: Option<u64>,
    #[arg(long)]
    pub max_retweets: Option<u64>,
    #[arg(long)]
    pub min_replies: Option<u64>,
    #[arg(long)]
    pub max_replies: Option<u64>,
    #[arg(long, conflicts_with = "window")]
    pub since: Option<NaiveDate>,
    #[arg(long, conflicts_with = "window")]
    pub until: Option<NaiveDate>,
    /// Relative range re-resolved on every use: 1d, 1w or 1m.
    #[arg(long)]
    pub window: Option<SlidingWindow>,
    #[arg(long = "from")]
    pub from_user: Option<String>,
    #[arg(long = "to")]
    pub to_user: Option<String>,
    #[arg(long = "mentions")]
    pub mentions_user: Option<String>,
    #[arg(long)]
    pub verified: bool,
    #[arg(long)]
    pub blue_verified: bool,
    #[arg(long)]
    pub follows: bool,
    #[arg(long)]
    pub media: bool,
    #[arg(long)]
    pub images: bool,
    #[arg(long)]
    pub videos: bool,
    #[arg(long)]
    pub links: bool,
    /// `true` to require replies, `false` to exclude them.
    #[arg(long)]
    pub replies: Option<bool>,
    /// `true` to require retweets, `false` to exclude them.
    #[arg(long)]
    pub retweets: Option<bool>,
    #[arg(long)]
    pub quote: bool,
    #[arg(long, requires = "within")]
    pub near: Option<String>,
    #[arg(long, requires = "near")]
    pub within: Option<String>,
    #[arg(long)]
    pub geocode: Option<String>,
    #[arg(long)]
    pub lang: Option<String>,
}

impl From<FilterArgs> for FilterSpec {
    fn from(args: FilterArgs) -> Self {
        FilterSpec {
            keywords: args.keywords,
            min_faves: args.min_faves,
            max_faves: args.max_faves,
            min_retweets: args.min_retweets,
            max_retweets: args.max_retweets,
            min_replies: args.min_replies,
            max_replies: args.max_replies,
            since_date: args.since,
            until_date: args.until,
            sliding_window: args.window,
            from_user: args.from_user,
            to_user: args.to_user,
            mentions_user: args.mentions_user,
            verified: args.verified,
            blue_verified: args.blue_verified,
            follows: args.follows,
            has_media: args.media,
            has_images: args.images,
            has_videos: args.videos,
            has_links: args.links,
            quote_only: args.quote,
            include_replies: args.replies,
            include_retweets: args.retweets,
            near: args.near,
            within: args.within,
            geocode: args.geocode,
            lang: args.lang,
        }
    }
}

/// Accept `#RRGGBB` only.
pub fn parse_hex_color(value: &str) -> Result<String, String> {
    let pattern = Regex::new("^#[0-9a-fA-F]{6}$").map_err(|e| e.to_string())?;
    if pattern.is_match(value) {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(format!("expected a #RRGGBB color, got {value:?}"))
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run `command` against `repo`, resolving sliding windows relative to
/// `today`, and return what should be printed.
pub async fn execute(
    command: Command,
    repo: &SearchRepository,
    today: NaiveDate,
    json: bool,
) -> anyhow::Result<String> {
    match command {
        Command::Compile(args) => {
            let filters = FilterSpec::from(args);
            Ok(compile(&filters.resolved(today)))
        }
        Command::Save { name, category, color, description, filters } => {
            let filters = FilterSpec::from(filters);
            let query = compile(&filters.resolved(today));
            let saved = repo
                .save_search(NewSearch { name, query, filters, category, color, description })
                .await?;
            render(json, &saved, || format!("{}\n{}", saved.id, saved.display_query(today)))
        }
        Command::List { category } => {
            let searches = match category {
                Some(category) => repo.get_searches_in_category(&category).await?,
                None => repo.get_saved_searches().await?,
            };
            render(json, &searches, || {
                searches
                    .iter()
                    .map(|s| search_line(s, today))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Apply { id } => repo
            .apply_search(&id, today)
            .await?
            .with_context(|| format!("no saved search with id {id}")),
        Command::Delete { id } => {
            repo.delete_search(&id).await?;
            Ok(format!("deleted {id}"))
        }
        Command::Reorder { ids } => {
            let searches = repo.reorder_searches(ids.as_slice()).await?;
            render(json, &searches, || {
                searches.iter().map(|s| s.id.as_str()).collect::<Vec<_>>().join("\n")
            })
        }
        Command::Category(command) => execute_category(command, repo, json).await,
        Command::Settings(SettingsCommand::Show) => {
            let settings = repo.get_settings().await?;
            render(json, &settings, || settings_text(&settings))
        }
        Command::Settings(SettingsCommand::Set { show_sidebar, default_view, theme }) => {
            let settings = repo
                .update_settings(SettingsUpdate { show_sidebar, default_view, theme })
                .await?;
            render(json, &settings, || settings_text(&settings))
        }
    }
}

async fn execute_category(
    command: CategoryCommand,
    repo: &SearchRepository,
    json: bool,
) -> anyhow::Result<String> {
    match command {
        CategoryCommand::List => {
            let categories = repo.get_categories().await?;
            let colors = repo.get_category_colors().await?;
            let counts = repo.get_all_category_usage_counts().await?;
            let rows: Vec<CategoryRow> = categories
                .iter()
                .map(|name| CategoryRow {
                    name,
                    color: colors.get(name).map(String::as_str).unwrap_or(DEFAULT_COLOR),
                    searches: counts.get(name).copied().unwrap_or(0),
                })
                .collect();
            render(json, &rows, || {
                rows.iter()
                    .map(|r| format!("{} {} ({})", r.color, r.name, r.searches))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        CategoryCommand::Create { name, color } => {
            let category = repo.create_category(&name, color.as_deref()).await?;
            render(json, &category, || format!("created {} {}", category.name, category.color))
        }
        CategoryCommand::Rename { old, new } => {
            let outcome = repo.rename_category(&old, &new).await?;
            render(json, &outcome, || {
                if outcome.renamed {
                    format!(
                        "renamed {old} to {} ({} searches updated)",
                        new.trim(),
                        outcome.searches_updated
                    )
                } else {
                    "nothing to rename".to_string()
                }
            })
        }
        CategoryCommand::Delete { name } => {
            let outcome = repo.delete_category(&name).await?;
            render(json, &outcome, || {
                if outcome.deleted {
                    format!("deleted {name} ({} searches moved)", outcome.searches_moved)
                } else {
                    format!("no category named {name}")
                }
            })
        }
        CategoryCommand::Color { name, color } => {
            let changed = repo.recolor_category(&name, &color).await?;
            let suffix = if changed { " (searches recolored)" } else { "" };
            Ok(format!("{name} is now {color}{suffix}"))
        }
    }
}

#[derive(Serialize)]
struct CategoryRow<'a> {
    name: &'a str,
    color: &'a str,
    searches: usize,
}

fn render<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text())
    }
}

fn settings_text(settings: &Settings) -> String {
    format!(
        "show_sidebar = {}\ndefault_view = {}\ntheme = {}",
        settings.show_sidebar, settings.default_view, settings.theme
    )
}

fn search_line(search: &SavedSearch, today: NaiveDate) -> String {
    format!(
        "{}  [{}] {}  {}  (used {}x)",
        search.id,
        search.category,
        search.name,
        search.display_query(today),
        search.use_count
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
