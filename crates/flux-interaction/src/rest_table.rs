//! REST table store backend.
//!
//! Two tables back the search: `<table>_index` with rows `{word, doc_ids}`
//! and `<table>_docs` keyed by `id`. Both are read through the store's REST
//! interface with an `apikey` header plus bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

use flux_core::config::RestTableConfig;
use flux_core::document::RawId;
use flux_core::error::{Result, SearchError};
use flux_core::search::{IdSet, RemoteQueryStrategy, run_cancellable};
use flux_core::Document;

use crate::http::{ensure_success, read_json};

const SERVICE: &str = "REST table store";

/// Row of the keyword index table.
#[derive(Debug, Deserialize)]
struct IndexRow {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    doc_ids: Option<Vec<RawId>>,
}

/// Backend talking to a REST table store.
#[derive(Clone)]
pub struct RestTableStore {
    client: Client,
    config: RestTableConfig,
}

impl RestTableStore {
    pub fn new(config: RestTableConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Reuses an existing HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn table_request(&self, table: &str) -> RequestBuilder {
        let url = format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            table
        );
        self.client
            .get(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    async fn read_rows<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| SearchError::network(format!("{SERVICE} request failed: {e}")))?;

        let response = ensure_success(response, SERVICE).await?;
        read_json(response, SERVICE).await
    }

    /// One filtered read covering every token.
    async fn query_keywords(&self, tokens: &[String]) -> Result<Vec<IdSet>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let filter = keyword_filter(tokens);
        let request = self
            .table_request(&self.config.index_table())
            .query(&[("select", "word,doc_ids"), ("or", filter.as_str())]);
        tracing::debug!(tokens = ?tokens, "Querying keyword table");

        let rows: Vec<IndexRow> = self.read_rows(request).await?;
        tracing::debug!(rows = rows.len(), "Keyword rows received");

        Ok(accumulate_ids(tokens, rows))
    }

    /// One filtered read over the document table.
    async fn query_documents(&self, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = self
            .table_request(&self.config.docs_table())
            .query(&[("id", id_filter(ids))]);
        tracing::debug!(count = ids.len(), "Fetching documents");

        let rows: Vec<Value> = self.read_rows(request).await?;
        Ok(order_documents(ids, rows))
    }
}

/// Disjunctive substring filter: `(word.ilike.*a*,word.ilike.*b*)`.
fn keyword_filter(tokens: &[String]) -> String {
    let clauses: Vec<String> = tokens
        .iter()
        .map(|token| format!("word.ilike.*{token}*"))
        .collect();
    format!("({})", clauses.join(","))
}

/// Membership filter: `in.("a","b")`.
fn id_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Splits the OR-ed rows back into one id set per token.
fn accumulate_ids(tokens: &[String], rows: Vec<IndexRow>) -> Vec<IdSet> {
    let mut sets = vec![IdSet::new(); tokens.len()];

    for row in rows {
        let Some(word) = row.word.map(|word| word.to_lowercase()) else {
            continue;
        };
        let ids: Vec<String> = row
            .doc_ids
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect();

        for (token, set) in tokens.iter().zip(sets.iter_mut()) {
            if word.contains(token.as_str()) {
                set.extend(ids.iter().cloned());
            }
        }
    }

    sets
}

/// Decodes document rows and returns them in requested id order.
///
/// Rows that fail to decode are dropped; ids without a row are skipped.
fn order_documents(ids: &[String], rows: Vec<Value>) -> Vec<Document> {
    let mut by_id: HashMap<String, Document> = HashMap::new();

    for row in rows {
        match Document::from_value(row) {
            Ok(doc) => {
                by_id.entry(doc.id.clone()).or_insert(doc);
            }
            Err(e) => tracing::warn!("Dropping malformed document row: {}", e),
        }
    }

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[async_trait]
impl RemoteQueryStrategy for RestTableStore {
    async fn fetch_ids(&self, tokens: &[String], cancel: &CancellationToken) -> Result<Vec<IdSet>> {
        run_cancellable(cancel, self.query_keywords(tokens)).await
    }

    async fn fetch_docs(&self, ids: &[String], cancel: &CancellationToken) -> Result<Vec<Document>> {
        run_cancellable(cancel, self.query_documents(ids)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn store(url: String) -> RestTableStore {
        RestTableStore::new(RestTableConfig {
            url,
            key: "anon-key".to_string(),
            table: "blog".to_string(),
        })
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn row(word: impl Into<Value>, ids: Value) -> IndexRow {
        let word: Value = word.into();
        serde_json::from_value(json!({"word": word, "doc_ids": ids})).unwrap()
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            keyword_filter(&strings(&["rust", "memory"])),
            "(word.ilike.*rust*,word.ilike.*memory*)"
        );
        assert_eq!(id_filter(&strings(&["a", "b\"c"])), r#"in.("a","b\"c")"#);
    }

    #[test]
    fn test_accumulate_ids_per_token() {
        let tokens = strings(&["rust", "mem"]);
        let rows = vec![
            row("Rust", json!(["1", "2"])),
            row("memory", json!([2, 3])),
            row("trustmemo", json!(["9"])),
            row("unrelated", json!(null)),
            row(Value::Null, json!(["7"])),
        ];

        let sets = accumulate_ids(&tokens, rows);
        assert_eq!(sets[0].iter().collect::<Vec<_>>(), vec!["1", "2", "9"]);
        assert_eq!(sets[1].iter().collect::<Vec<_>>(), vec!["2", "3", "9"]);
    }

    #[test]
    fn test_order_documents_follows_requested_ids() {
        let rows = vec![
            json!({"id": "b", "title": "B", "url": "/b/"}),
            json!({"id": "a", "title": "A", "url": "/a/"}),
            json!({"title": "no id"}),
        ];
        let docs = order_documents(&strings(&["a", "missing", "b"]), rows);
        assert_eq!(
            docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[tokio::test]
    async fn test_fetch_ids_reads_index_table() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/blog_index")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "word,doc_ids".into()),
                Matcher::UrlEncoded(
                    "or".into(),
                    "(word.ilike.*rust*,word.ilike.*memory*)".into(),
                ),
            ]))
            .with_status(200)
            .with_body(
                json!([
                    {"word": "rust", "doc_ids": ["1", "2", "3"]},
                    {"word": "memory", "doc_ids": ["2", "3", "4"]}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let sets = store(server.url())
            .fetch_ids(&strings(&["rust", "memory"]), &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(sets[0].iter().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(sets[1].iter().collect::<Vec<_>>(), vec!["2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_row_without_word_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/blog_index")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!([
                    {"word": null, "doc_ids": ["9"]},
                    {"doc_ids": ["8"]},
                    {"word": "rust", "doc_ids": ["1"]}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let sets = store(server.url())
            .fetch_ids(&strings(&["rust"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(sets[0].iter().collect::<Vec<_>>(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_fetch_docs_reads_docs_table() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/blog_docs")
            .match_query(Matcher::UrlEncoded("id".into(), r#"in.("2","3")"#.into()))
            .with_status(200)
            .with_body(
                json!([
                    {"id": "3", "title": "Three", "url": "/3/"},
                    {"id": "2", "title": "Two", "url": "/2/", "encrypted": true}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let docs = store(server.url())
            .fetch_docs(&strings(&["2", "3"]), &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "2");
        assert!(docs[0].encrypted);
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/blog_index")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"message":"relation does not exist"}"#)
            .create_async()
            .await;

        let err = store(server.url())
            .fetch_ids(&strings(&["rust"]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Network { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = store(server.url())
            .fetch_ids(&strings(&["rust"]), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        mock.assert_async().await;
    }
}
