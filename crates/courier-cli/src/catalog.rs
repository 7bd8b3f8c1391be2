//! Catalog - collections と episodes を取得してまとめる pipeline
//!
//! すべての関数は Session を引数で受け取る（グローバルな session は持たない）。
//! 結果は Task のまま返し、起動は呼び出し側（main / テスト）が行う。

use std::sync::Arc;

use courier_core::{Endpoint, Session, Task};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub number: u32,
    pub title: String,
    /// Id of the owning [`Collection`].
    pub collection: String,
}

/// The two list endpoints under one base URL.
#[derive(Debug, Clone)]
pub struct Catalog {
    collections: Endpoint<Vec<Collection>>,
    episodes: Endpoint<Vec<Episode>>,
}

impl Catalog {
    /// `base` is treated as a directory: `https://host/api` and
    /// `https://host/api/` both resolve to `https://host/api/collections.json`.
    pub fn new(base: &Url) -> Result<Self, url::ParseError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            collections: Endpoint::json(base.join("collections.json")?),
            episodes: Endpoint::json(base.join("episodes.json")?),
        })
    }

    pub fn collections(&self) -> &Endpoint<Vec<Collection>> {
        &self.collections
    }

    pub fn episodes(&self) -> &Endpoint<Vec<Episode>> {
        &self.episodes
    }
}

/// Titles of the chosen collection's episodes, joined with `,`.
///
/// Picks the collection with id `collection`, or the first one when `None`.
/// No matching collection means no result, and the episodes list is never
/// requested.
pub fn episode_titles(
    session: Arc<dyn Session>,
    catalog: &Catalog,
    collection: Option<String>,
) -> Task<String> {
    let episodes = catalog.episodes.clone();
    Task::from_endpoint(Arc::clone(&session), catalog.collections.clone())
        .compact_map(move |collections| match collection {
            Some(id) => collections.into_iter().find(|c| c.id == id),
            None => collections.into_iter().next(),
        })
        .flat_map(move |chosen| {
            Task::from_endpoint(session, episodes).map(move |episodes| {
                episodes
                    .into_iter()
                    .filter(|e| e.collection == chosen.id)
                    .map(|e| e.title)
                    .collect::<Vec<_>>()
                    .join(",")
            })
        })
}

/// Every collection title, in catalog order.
pub fn collection_titles(session: Arc<dyn Session>, catalog: &Catalog) -> Task<Vec<String>> {
    Task::from_endpoint(session, catalog.collections.clone())
        .map(|collections| collections.into_iter().map(|c| c.title).collect())
}

/// `<title>: <episode count>` per collection; both lists are fetched
/// concurrently.
pub fn summary(session: Arc<dyn Session>, catalog: &Catalog) -> Task<Vec<String>> {
    let collections = Task::from_endpoint(Arc::clone(&session), catalog.collections.clone());
    let episodes = Task::from_endpoint(session, catalog.episodes.clone());
    collections.zip_with(episodes, |collections, episodes| {
        collections
            .iter()
            .map(|c| {
                let count = episodes.iter().filter(|e| e.collection == c.id).count();
                format!("{}: {}", c.title, count)
            })
            .collect()
    })
}
