//! MongoDB-backed [`CollectionStore`].

use super::CollectionStore;
use crate::error::QueryError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Default database name.
pub const DEFAULT_DATABASE: &str = "artm-lmos";

/// One connection pool shared by every query.
///
/// Each `find` checks a connection out of the pool for the duration of the
/// call only.
#[derive(Clone)]
pub struct MongoCollectionStore {
    database: Database,
}

impl MongoCollectionStore {
    /// Parse `uri` and build a client whose pool holds at most `max_pool_size`
    /// connections. Connections are opened lazily.
    pub async fn connect(
        uri: &str,
        database: &str,
        max_pool_size: u32,
    ) -> Result<Self, QueryError> {
        let mut options = ClientOptions::parse(uri).await.map_err(backend)?;
        options.max_pool_size = Some(max_pool_size.max(1));
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options).map_err(backend)?;
        info!(
            "MongoDB pool ready (database '{}', max {} connections)",
            database, max_pool_size
        );
        Ok(Self::from_database(client.database(database)))
    }

    pub fn from_database(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl CollectionStore for MongoCollectionStore {
    async fn find(
        &self,
        collection: &str,
        filter: Map<String, Value>,
        fields: &[String],
        limit: i64,
    ) -> Result<Vec<Value>, QueryError> {
        let filter = bson::to_document(&filter).map_err(|e| QueryError::MalformedQuery {
            detail: e.to_string(),
        })?;
        let projection = projection(fields);
        debug!("find on '{}': {}", collection, filter);

        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(filter)
            .projection(projection)
            .limit(limit)
            .await
            .map_err(backend)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(backend)?;

        Ok(docs
            .into_iter()
            .map(|d| Bson::Document(d).into_relaxed_extjson())
            .collect())
    }
}

/// Inclusion projection for `fields`. `_id` is excluded unless listed.
fn projection(fields: &[String]) -> Document {
    let mut p = Document::new();
    for f in fields {
        p.insert(f.as_str(), 1);
    }
    if !fields.iter().any(|f| f == "_id") {
        p.extend(doc! { "_id": 0 });
    }
    p
}

fn backend(e: mongodb::error::Error) -> QueryError {
    QueryError::Backend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_includes_listed_fields() {
        let p = projection(&["_id".to_string(), "name".to_string()]);
        assert_eq!(p, doc! { "_id": 1, "name": 1 });
    }

    #[test]
    fn projection_hides_id_when_unlisted() {
        let p = projection(&["name".to_string()]);
        assert_eq!(p, doc! { "name": 1, "_id": 0 });
    }
}
