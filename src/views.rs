//! Item Views
//!
//! Derives the displayed listing from the item store: search, then sort or
//! category filter, then type filter. The order is fixed.

use crate::error::ApiError;
use crate::mime;
use crate::store::Item;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Sort mode selected in the listing controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Store order, nothing removed.
    #[default]
    Default,
    /// Folders only.
    Folders,
    /// Files only.
    Files,
    /// Most recent first, by parsed date. Ties keep store order.
    Recent,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Default => "default",
            SortMode::Folders => "folders",
            SortMode::Files => "files",
            SortMode::Recent => "recent",
        }
    }
}

impl FromStr for SortMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(SortMode::Default),
            "folders" => Ok(SortMode::Folders),
            "files" => Ok(SortMode::Files),
            "recent" => Ok(SortMode::Recent),
            other => Err(ApiError::ConfigError(format!(
                "Invalid sort mode: {}. Must be default, folders, files, or recent",
                other
            ))),
        }
    }
}

/// Listing controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    /// Case-insensitive substring of the name. Empty matches everything.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: SortMode,
    /// Extension or subtype, with or without a leading dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_filter: Option<String>,
}

impl ViewQuery {
    pub fn new(search: impl Into<String>, sort: SortMode, type_filter: Option<String>) -> Self {
        Self {
            search: search.into(),
            sort,
            type_filter,
        }
    }
}

/// Fold for case-insensitive comparison: NFC, then lowercase.
fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

fn matches_search(item: &Item, folded_query: &str) -> bool {
    fold(&item.name).contains(folded_query)
}

fn normalized_type_filter(filter: Option<&str>) -> Option<String> {
    let filter = filter?.trim().trim_start_matches('.');
    if filter.is_empty() {
        None
    } else {
        Some(filter.to_ascii_lowercase())
    }
}

fn matches_type(item: &Item, filter: &str) -> bool {
    if !item.is_file() {
        return false;
    }
    let by_extension = mime::extension_of(&item.name)
        .map(|ext| ext.eq_ignore_ascii_case(filter))
        .unwrap_or(false);
    by_extension || item.sub_type.eq_ignore_ascii_case(filter)
}

/// Project `items` through `query`.
pub fn project<'a>(items: &'a [Item], query: &ViewQuery) -> Vec<&'a Item> {
    let mut view: Vec<&Item> = items.iter().collect();

    if !query.search.is_empty() {
        let folded = fold(&query.search);
        view.retain(|item| matches_search(item, &folded));
    }

    match query.sort {
        SortMode::Default => {}
        SortMode::Folders => view.retain(|item| item.is_folder()),
        SortMode::Files => view.retain(|item| item.is_file()),
        SortMode::Recent => {
            // Stable: equal or unparseable dates keep their relative order,
            // unparseable ones after every dated item.
            view.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        }
    }

    if let Some(filter) = normalized_type_filter(query.type_filter.as_deref()) {
        view.retain(|item| matches_type(item, &filter));
    }

    view
}
