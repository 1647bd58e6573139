use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

pub const DAYS_CHOICES: [u32; 4] = [1, 2, 3, 7];
pub const LIMIT_CHOICES: [u32; 4] = [15, 25, 50, 100];
pub const CATEGORY_CHOICES: [&str; 8] = [
    "",
    "general",
    "threats",
    "vulnerabilities",
    "alerts",
    "industry",
    "research",
    "technical",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub published_date: String, // ISO 8601, kept as sent
    pub summary: String,
    pub keywords: Vec<String>,
    pub priority_score: Number,
    /// The JSON object this article was decoded from, if any. Serializing
    /// writes it back untouched so exports keep the backend's keys.
    pub received: Option<Value>,
}

#[derive(Deserialize)]
struct ArticleFields {
    #[serde(alias = "article_id")]
    id: String,
    title: String,
    url: String,
    source: String,
    category: String,
    published_date: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    keywords: Vec<String>,
    priority_score: Number,
}

#[derive(Serialize)]
struct ArticleRef<'a> {
    id: &'a str,
    title: &'a str,
    url: &'a str,
    source: &'a str,
    category: &'a str,
    published_date: &'a str,
    summary: &'a str,
    keywords: &'a [String],
    priority_score: &'a Number,
}

impl<'de> Deserialize<'de> for Article {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let f = ArticleFields::deserialize(&raw).map_err(de::Error::custom)?;
        Ok(Article {
            id: f.id,
            title: f.title,
            url: f.url,
            source: f.source,
            category: f.category,
            published_date: f.published_date,
            summary: f.summary,
            keywords: f.keywords,
            priority_score: f.priority_score,
            received: Some(raw),
        })
    }
}

impl Serialize for Article {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(raw) = &self.received {
            return raw.serialize(serializer);
        }
        ArticleRef {
            id: &self.id,
            title: &self.title,
            url: &self.url,
            source: &self.source,
            category: &self.category,
            published_date: &self.published_date,
            summary: &self.summary,
            keywords: &self.keywords,
            priority_score: &self.priority_score,
        }
        .serialize(serializer)
    }
}

impl Article {
    pub fn priority_score(&self) -> f64 {
        self.priority_score.as_f64().unwrap_or(0.0)
    }

    pub fn priority(&self) -> Priority {
        Priority::from_score(self.priority_score())
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        // The backend serializes naive datetimes without an offset.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn date_line(&self) -> String {
        match self.published() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => "—".to_string(),
        }
    }
}

/// Display-only bucket for a backend priority score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Normal,
}

impl Priority {
    pub fn from_score(score: f64) -> Self {
        if score > 20.0 {
            Priority::High
        } else if score > 10.0 {
            Priority::Medium
        } else {
            Priority::Normal
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub url: String,
}

fn default_enabled() -> bool {
    true
}

/// Aggregates computed by the backend over its whole cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendStatistics {
    pub total_articles: u64,
    pub sources_count: u64,
    pub high_priority_count: u64,
    #[serde(default)]
    pub categories: BTreeMap<String, u64>,
    #[serde(default)]
    pub last_updated: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSummary {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub article_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    pub days_back: u32,
    /// Empty means all categories.
    pub category: String,
    pub limit: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            days_back: 1,
            category: String::new(),
            limit: 50,
        }
    }
}

impl FilterConfig {
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(days_back) = patch.days_back {
            self.days_back = days_back;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(limit) = patch.limit {
            self.limit = limit;
        }
    }

    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            "all"
        } else {
            &self.category
        }
    }
}

/// Partial filter update; `None` fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub days_back: Option<u32>,
    pub category: Option<String>,
    pub limit: Option<u32>,
}

impl FilterPatch {
    pub fn days_back(days_back: u32) -> Self {
        Self { days_back: Some(days_back), ..Self::default() }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::default() }
    }

    pub fn limit(limit: u32) -> Self {
        Self { limit: Some(limit), ..Self::default() }
    }
}

/// Returns the element after `current` in `choices`, wrapping around.
/// Values outside the list restart at the first choice.
pub fn next_choice<T: PartialEq + Clone>(choices: &[T], current: &T) -> T {
    let idx = choices
        .iter()
        .position(|c| c == current)
        .map(|i| (i + 1) % choices.len())
        .unwrap_or(0);
    choices[idx].clone()
}
