use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::{
    collection::Collection,
    error::{ContextExt, LogErr},
    front_matter,
    fs::write_file,
};

/// Front matter written for a freshly created entry. Always a draft.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub title: String,
    pub description: String,
    pub pub_date: String,
    pub tags: Vec<String>,
    pub draft: bool,
}

impl NewEntry {
    pub fn new(title: &str, description: &str, tags: Vec<String>, date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            pub_date: date.format("%Y-%m-%d").to_string(),
            tags,
            draft: true,
        }
    }

    pub fn render(&self) -> Result<String, LogErr> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("---\n{yaml}---\n\n"))
    }
}

/// Lowercase ASCII letters and digits, everything else collapsed into single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Writes `entry` as `<base>/<slug>.md` in `collection`, validating it first.
pub async fn create_entry(
    root: &Path,
    collection: &Collection,
    entry: &NewEntry,
    force: bool,
) -> Result<PathBuf, LogErr> {
    let slug = slugify(&entry.title);
    if slug.is_empty() {
        return Err(format!("title {:?} does not produce a file name", entry.title).into());
    }

    let content = entry.render()?;
    let document = front_matter::parse(&content)?;
    collection.schema().validate(&document.front_matter)?;

    let path = root
        .join(collection.loader().base())
        .join(format!("{slug}.md"));
    write_file(&path, content.as_bytes(), force)
        .await
        .with_context(|| format!("new entry: {}", path.display()))?;
    info!("created {}", path.display());
    Ok(path)
}
