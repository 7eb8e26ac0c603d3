//! Collection query passthrough.
//!
//! Callers send a JSON filter and a collection name. The collection must be
//! on the allow-list in [`QueryConfig`], the filter must be a JSON object
//! without server-side JavaScript operators, and only the collection's listed
//! fields are returned. The projection is sent to the database and applied
//! again to every returned document.

#[cfg(feature = "server")]
pub mod mongo;

use crate::config::{CollectionPolicy, QueryConfig};
use crate::error::QueryError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

#[cfg(feature = "server")]
pub use mongo::MongoCollectionStore;

/// Operators that run JavaScript on the database server.
const FORBIDDEN_OPERATORS: [&str; 3] = ["$where", "$function", "$accumulator"];

/// Body of a query request. Both fields are required; they are optional here
/// so a missing field yields [`QueryError::MissingFields`] instead of a
/// deserialisation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default, rename = "collectionName")]
    pub collection_name: Option<String>,
}

/// Database seam used by [`execute_query`].
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Find documents in `collection` matching `filter`, returning at most
    /// `limit` documents restricted to `fields`.
    async fn find(
        &self,
        collection: &str,
        filter: Map<String, Value>,
        fields: &[String],
        limit: i64,
    ) -> Result<Vec<Value>, QueryError>;
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery<'a> {
    pub policy: &'a CollectionPolicy,
    pub filter: Map<String, Value>,
}

/// Check `request` against the allow-list and the filter rules.
pub fn validate<'a>(
    config: &'a QueryConfig,
    request: QueryRequest,
) -> Result<ValidatedQuery<'a>, QueryError> {
    let (query, name) = match (request.query, request.collection_name) {
        (Some(q), Some(n)) if !q.is_null() => (q, n),
        _ => return Err(QueryError::MissingFields),
    };

    let policy = config
        .policy(&name)
        .ok_or(QueryError::InvalidCollection { name })?;

    let filter = match query {
        Value::Object(map) => map,
        other => {
            return Err(QueryError::MalformedQuery {
                detail: format!("expected an object, got {}", type_name(&other)),
            })
        }
    };

    if let Some(op) = find_forbidden(&filter) {
        return Err(QueryError::MalformedQuery {
            detail: format!("operator '{}' is not allowed", op),
        });
    }

    Ok(ValidatedQuery { policy, filter })
}

/// Validate `request`, run it, and return the projected documents.
pub async fn execute_query(
    store: &dyn CollectionStore,
    config: &QueryConfig,
    request: QueryRequest,
) -> Result<Vec<Value>, QueryError> {
    let validated = validate(config, request)?;
    let policy = validated.policy;
    debug!(
        "Querying '{}' with {} filter key(s)",
        policy.name,
        validated.filter.len()
    );

    let docs = store
        .find(&policy.name, validated.filter, &policy.fields, config.max_results)
        .await?;

    let results: Vec<Value> = docs
        .into_iter()
        .take(config.max_results.max(0) as usize)
        .map(|d| project(d, &policy.fields))
        .collect();

    info!("Query on '{}' returned {} document(s)", policy.name, results.len());
    Ok(results)
}

/// Keep only `fields` of `doc`. Non-object values become empty objects.
pub fn project(doc: Value, fields: &[String]) -> Value {
    match doc {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| fields.iter().any(|f| f == k))
                .collect(),
        ),
        _ => Value::Object(Map::new()),
    }
}

fn find_forbidden(map: &Map<String, Value>) -> Option<&'static str> {
    for (key, value) in map {
        if let Some(op) = FORBIDDEN_OPERATORS.iter().find(|op| **op == key.as_str()) {
            return Some(*op);
        }
        if let Some(op) = find_forbidden_in(value) {
            return Some(op);
        }
    }
    None
}

fn find_forbidden_in(value: &Value) -> Option<&'static str> {
    match value {
        Value::Object(map) => find_forbidden(map),
        Value::Array(items) => items.iter().find_map(find_forbidden_in),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
