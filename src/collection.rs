use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry as MapEntry},
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use tokio::fs::read_to_string;
use tracing::{info, warn};

use crate::{
    config::{CollectionConfig, Config},
    error::{ContextExt, DocumentError, DocumentErrorKind, LogErr},
    front_matter,
    loader::GlobLoader,
    metadata::{LogEntryMetadata, Schema},
    r#async::try_map,
};

/// Name of the collection holding log entries.
pub const LOG: &str = "log";

/// One validated document of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: Arc<str>,
    #[serde(skip)]
    pub path: PathBuf,
    pub data: LogEntryMetadata,
    #[serde(skip)]
    pub body: String,
}

/// Validated entries, newest `pubDate` first.
#[derive(Debug, Default)]
pub struct LogEntries {
    entries: Vec<Arc<Entry>>,
    by_id: HashMap<Arc<str>, Arc<Entry>>,
    tags: HashMap<Arc<str>, Vec<Arc<Entry>>>,
}

impl LogEntries {
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| {
            b.data
                .pub_date
                .cmp(&a.data.pub_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut collection = Self::default();
        for entry in entries {
            collection.add(Arc::new(entry));
        }
        collection
    }

    fn add(&mut self, entry: Arc<Entry>) {
        self.by_id.insert(entry.id.clone(), entry.clone());
        for tag in entry.data.tags.iter() {
            let tag: Arc<str> = Arc::from(tag.as_str());
            match self.tags.entry(tag) {
                MapEntry::Vacant(e) => {
                    e.insert(vec![entry.clone()]);
                }
                MapEntry::Occupied(mut e) => {
                    if !e.get().iter().any(|other| Arc::ptr_eq(other, &entry)) {
                        e.get_mut().push(entry.clone());
                    }
                }
            }
        }
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.by_id.get(id).map(|entry| entry.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().map(|entry| entry.as_ref())
    }

    pub fn published(&self) -> impl Iterator<Item = &Entry> {
        self.iter().filter(|entry| !entry.data.draft)
    }

    /// Every tag in use, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tags.keys().map(|tag| tag.as_ref()).collect();
        tags.sort_unstable();
        tags
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Entry> {
        self.tags
            .get(tag)
            .map(|entries| entries.iter().map(|entry| entry.as_ref()).collect())
            .unwrap_or_default()
    }
}

/// Result of loading a collection: the valid entries and every rejected document.
#[derive(Debug)]
pub struct Loaded {
    pub entries: LogEntries,
    pub failures: Vec<DocumentError>,
}

impl Loaded {
    /// Any rejected document blocks the build.
    pub fn into_result(self) -> Result<LogEntries, LogErr> {
        if self.failures.is_empty() {
            Ok(self.entries)
        } else {
            Err(LogErr::InvalidDocuments(self.failures))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collection {
    name: Arc<str>,
    loader: GlobLoader,
    schema: Schema,
}

impl Collection {
    pub fn new(name: &str, loader: GlobLoader, schema: Schema) -> Self {
        Self {
            name: Arc::from(name),
            loader,
            schema,
        }
    }

    pub fn from_config(name: &str, config: &CollectionConfig) -> Result<Self, LogErr> {
        Ok(Self::new(
            name,
            GlobLoader::new(&config.pattern, &config.base)
                .with_context(|| format!("collection: {name}"))?,
            Schema::new(config.unknown_fields),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn loader(&self) -> &GlobLoader {
        &self.loader
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Reads and validates every document of the collection below `root`.
    pub async fn load(&self, root: &Path) -> Result<Loaded, LogErr> {
        let paths = self.loader.discover(root).await?;
        let mut input = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();
        let mut seen: HashMap<Arc<str>, PathBuf> = HashMap::new();
        for path in paths {
            let id = self
                .loader
                .entry_id(root, &path)
                .ok_or_else(|| format!("document outside collection base: {}", path.display()))?;
            // paths are sorted, so the first file for an id keeps it
            match seen.entry(id.clone()) {
                MapEntry::Occupied(first) => {
                    let failure = DocumentError {
                        path,
                        kind: DocumentErrorKind::DuplicateId {
                            id: id.to_string(),
                            first: first.get().clone(),
                        },
                    };
                    warn!("{failure}");
                    failures.push(failure);
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(path.clone());
                    input.push((path, id, self.schema));
                }
            }
        }

        let results = try_map(input, load_document).await?;

        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(entry) => entries.push(entry),
                Err(failure) => {
                    warn!("{failure}");
                    failures.push(failure);
                }
            }
        }

        info!(
            "collection {}: {} valid, {} invalid",
            self.name,
            entries.len(),
            failures.len()
        );
        Ok(Loaded {
            entries: LogEntries::new(entries),
            failures,
        })
    }
}

async fn load_document(
    (path, id, schema): (PathBuf, Arc<str>, Schema),
) -> Result<Result<Entry, DocumentError>, LogErr> {
    let source = read_to_string(&path)
        .await
        .with_context(|| format!("read document: {}", path.display()))?;

    let parsed = front_matter::parse(&source)
        .map_err(DocumentErrorKind::from)
        .and_then(|document| {
            schema
                .validate(&document.front_matter)
                .map(|data| (data, document.body))
                .map_err(DocumentErrorKind::from)
        });

    Ok(match parsed {
        Ok((data, body)) => Ok(Entry {
            id,
            path,
            data,
            body,
        }),
        Err(kind) => Err(DocumentError { path, kind }),
    })
}

/// Collections by name, as requested by the site generator.
#[derive(Debug, Clone)]
pub struct Collections {
    collections: BTreeMap<Arc<str>, Collection>,
}

impl Collections {
    pub fn from_config(config: &Config) -> Result<Self, LogErr> {
        let mut collections = BTreeMap::new();
        for (name, collection) in config.collections.iter() {
            collections.insert(name.clone(), Collection::from_config(name, collection)?);
        }
        Ok(Self { collections })
    }

    pub fn get(&self, name: &str) -> Result<&Collection, LogErr> {
        self.collections
            .get(name)
            .ok_or_else(|| LogErr::UnknownCollection(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|name| name.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }
}
