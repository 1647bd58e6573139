use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::Result;
use crate::model::Article;

pub fn export_file_name(date: NaiveDate) -> String {
    format!("cybernews_export_{}.json", date.format("%Y-%m-%d"))
}

/// Writes `articles` as pretty-printed JSON into `dir`, named after the
/// current UTC date.
pub fn export_to_dir(articles: &[Article], dir: &Path) -> Result<PathBuf> {
    export_to_dir_on(articles, dir, Utc::now().date_naive())
}

pub fn export_to_dir_on(articles: &[Article], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    let json = serde_json::to_string_pretty(articles)?;
    fs::write(&path, json)?;
    info!(path = %path.display(), count = articles.len(), "exported articles");
    Ok(path)
}
