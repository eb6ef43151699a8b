//! Hash-scan key-value store backend.
//!
//! Keywords live in a hash `<prefix>:index` mapping each word to a
//! comma-joined id list; documents live in `<prefix>:docs` mapping id to a
//! JSON blob. Commands are posted as JSON arrays over REST with a bearer
//! token: a pipeline of `HSCAN` calls for keyword lookup and one `HMGET` for
//! hydration.
//!
//! Only the first scan page (`COUNT 1000`) is read per token, so a keyword
//! hash larger than one page can miss matches.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use flux_core::config::HashScanConfig;
use flux_core::error::{Result, SearchError};
use flux_core::search::{IdSet, RemoteQueryStrategy, run_cancellable};
use flux_core::Document;

use crate::http::{ensure_success, read_json};

const SERVICE: &str = "hash-scan store";

/// Scan page size hint sent with every `HSCAN`.
pub const SCAN_COUNT: u64 = 1000;

/// Reply to a single command, alone or inside a pipeline.
#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl CommandReply {
    fn into_result(self) -> Result<Option<Value>> {
        match self.error {
            Some(error) => Err(SearchError::network(format!("{SERVICE} command failed: {error}"))),
            None => Ok(self.result),
        }
    }
}

/// Backend talking to a REST-fronted key-value store.
#[derive(Clone)]
pub struct HashScanStore {
    client: Client,
    config: HashScanConfig,
}

impl HashScanStore {
    pub fn new(config: HashScanConfig) -> Self {
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

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn scan_command(&self, token: &str) -> Value {
        json!([
            "HSCAN",
            self.config.index_key(),
            "0",
            "MATCH",
            format!("*{token}*"),
            "COUNT",
            SCAN_COUNT
        ])
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.token)
            .json(body)
            .send()
            .await
            .map_err(|e| SearchError::network(format!("{SERVICE} request failed: {e}")))?;

        let response = ensure_success(response, SERVICE).await?;
        read_json(response, SERVICE).await
    }
}

/// Extracts ids from an `HSCAN` result `[cursor, [field, value, ...]]`.
///
/// Values (odd positions) are comma-joined id lists.
fn parse_scan_result(result: &Value) -> IdSet {
    let mut ids = IdSet::new();

    let Some(fields) = result
        .as_array()
        .and_then(|parts| parts.get(1))
        .and_then(|fields| fields.as_array())
    else {
        return ids;
    };

    for value in fields.iter().skip(1).step_by(2) {
        if let Some(list) = value.as_str() {
            ids.extend(list.split(',').filter(|id| !id.is_empty()));
        }
    }

    ids
}

/// Decodes `HMGET` blobs, dropping misses and corrupt records.
fn parse_document_blobs(ids: &[String], blobs: Vec<Option<String>>) -> Vec<Document> {
    blobs
        .into_iter()
        .enumerate()
        .filter_map(|(idx, blob)| {
            let blob = blob.filter(|b| !b.is_empty())?;
            match Document::from_json(&blob) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!(
                        id = ids.get(idx).map(String::as_str).unwrap_or("?"),
                        "Dropping malformed stored document: {}",
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

impl HashScanStore {
    /// One `HSCAN` per token, sent as a single pipeline.
    async fn scan_keywords(&self, tokens: &[String]) -> Result<Vec<IdSet>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let pipeline: Vec<Value> = tokens.iter().map(|t| self.scan_command(t)).collect();
        let url = format!("{}/pipeline", self.base_url());
        tracing::debug!(tokens = ?tokens, "Scanning keyword index");

        let replies: Vec<CommandReply> = self.post(&url, &Value::Array(pipeline)).await?;
        if replies.len() != tokens.len() {
            tracing::warn!(
                expected = tokens.len(),
                received = replies.len(),
                "Pipeline reply count mismatch"
            );
        }

        let mut replies = replies.into_iter();
        let mut sets = Vec::with_capacity(tokens.len());
        for token in tokens {
            let set = match replies.next() {
                Some(reply) => reply
                    .into_result()?
                    .as_ref()
                    .map(parse_scan_result)
                    .unwrap_or_default(),
                None => IdSet::new(),
            };
            tracing::debug!(token = %token, matches = set.len(), "Keyword scan");
            sets.push(set);
        }

        Ok(sets)
    }

    /// One `HMGET` over the document hash.
    async fn get_documents(&self, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut command = vec![json!("HMGET"), json!(self.config.docs_key())];
        command.extend(ids.iter().map(|id| json!(id)));
        tracing::debug!(count = ids.len(), "Fetching documents");

        let reply: CommandReply = self.post(self.base_url(), &Value::Array(command)).await?;
        let blobs: Vec<Option<String>> = match reply.into_result()? {
            Some(result) => serde_json::from_value(result).map_err(|e| {
                SearchError::network(format!("Malformed {SERVICE} HMGET result: {e}"))
            })?,
            None => Vec::new(),
        };

        Ok(parse_document_blobs(ids, blobs))
    }
}

#[async_trait]
impl RemoteQueryStrategy for HashScanStore {
    async fn fetch_ids(&self, tokens: &[String], cancel: &CancellationToken) -> Result<Vec<IdSet>> {
        run_cancellable(cancel, self.scan_keywords(tokens)).await
    }

    async fn fetch_docs(&self, ids: &[String], cancel: &CancellationToken) -> Result<Vec<Document>> {
        run_cancellable(cancel, self.get_documents(ids)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn store(url: String) -> HashScanStore {
        HashScanStore::new(HashScanConfig {
            url,
            token: "secret".to_string(),
            index: "blog".to_string(),
        })
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_scan_result_splits_id_lists() {
        let result = json!(["0", ["rust", "1,2", "rusty", "2,3", "trust", ""]]);
        let ids = parse_scan_result(&result);
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parse_scan_result_tolerates_odd_shapes() {
        assert!(parse_scan_result(&json!(null)).is_empty());
        assert!(parse_scan_result(&json!(["0"])).is_empty());
        assert!(parse_scan_result(&json!(["0", []])).is_empty());
    }

    #[test]
    fn test_parse_document_blobs_drops_misses_and_corrupt() {
        let ids = tokens(&["1", "2", "3", "4"]);
        let blobs = vec![
            Some(r#"{"id":"1","title":"One","url":"/1/"}"#.to_string()),
            None,
            Some("{not json".to_string()),
            Some(String::new()),
        ];
        let docs = parse_document_blobs(&ids, blobs);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "1");
    }

    #[tokio::test]
    async fn test_fetch_ids_sends_pipeline_of_scans() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pipeline")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!([
                ["HSCAN", "blog:index", "0", "MATCH", "*rust*", "COUNT", 1000],
                ["HSCAN", "blog:index", "0", "MATCH", "*memory*", "COUNT", 1000]
            ])))
            .with_status(200)
            .with_body(
                json!([
                    {"result": ["0", ["rust", "1,2,3"]]},
                    {"result": ["0", ["memory", "2,3,4"]]}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let sets = store(server.url())
            .fetch_ids(&tokens(&["rust", "memory"]), &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].iter().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(sets[1].iter().collect::<Vec<_>>(), vec!["2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_fetch_ids_pads_missing_replies() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/pipeline")
            .with_status(200)
            .with_body(json!([{"result": ["0", ["a", "1"]]}]).to_string())
            .create_async()
            .await;

        let sets = store(server.url())
            .fetch_ids(&tokens(&["a", "b"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(sets.len(), 2);
        assert!(sets[1].is_empty());
    }

    #[tokio::test]
    async fn test_fetch_ids_command_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/pipeline")
            .with_status(200)
            .with_body(json!([{"error": "WRONGTYPE"}]).to_string())
            .create_async()
            .await;

        let err = store(server.url())
            .fetch_ids(&tokens(&["a"]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_fetch_ids_bad_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/pipeline")
            .with_status(401)
            .with_body(r#"{"error":"Unauthorized"}"#)
            .create_async()
            .await;

        let err = store(server.url())
            .fetch_ids(&tokens(&["a"]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Network { status: Some(401), .. }));
    }

    #[tokio::test]
    async fn test_cancelled_token_issues_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let store = store(server.url());
        let err = store.fetch_ids(&tokens(&["a"]), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        let err = store.fetch_docs(&tokens(&["1"]), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_docs_uses_single_hmget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!(["HMGET", "blog:docs", "2", "9", "3"])))
            .with_status(200)
            .with_body(
                json!({
                    "result": [
                        r#"{"id":"2","title":"Two","url":"/2/"}"#,
                        null,
                        r#"{"id":"3","title":"Three","url":"/3/","type":"project"}"#
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let docs = store(server.url())
            .fetch_docs(&tokens(&["2", "9", "3"]), &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["2", "3"]
        );
    }
}
