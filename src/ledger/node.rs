//! JSON-RPC client for a chain node.
//!
//! Queries go through the node's ABCI query endpoint under
//! `custom/gitService/...`; submissions are broadcast-and-wait, so the
//! caller blocks until the transaction is confirmed or rejected.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{AdvertisedRefs, Ledger};
use crate::config::JoystreamRemoteConfig;
use crate::error::Error;
use crate::repository::RepositoryCoordinate;

/// Query route prefix of the git module on the chain.
const MODULE_NAME: &str = "gitService";

pub struct NodeClient {
    http: reqwest::Client,
    node_url: String,
    author: Option<String>,

    /// Tokio runtime for driving the async HTTP client from the synchronous
    /// command loop.
    runtime: tokio::runtime::Runtime,
}

impl NodeClient {
    pub fn new(config: &JoystreamRemoteConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let runtime =
            tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        Ok(Self {
            http,
            node_url: config.node_url.clone(),
            author: config.author.clone(),
            runtime,
        })
    }

    /// Perform one JSON-RPC call and return its `result` payload.
    fn rpc(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, node = %self.node_url, "sending rpc request");

        let response: serde_json::Value = self.runtime.block_on(async {
            self.http
                .post(&self.node_url)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        })?;

        if let Some(err) = response.get("error") {
            anyhow::bail!("node returned rpc error: {}", err);
        }

        Ok(response.get("result").cloned().unwrap_or(json!(null)))
    }

    /// ABCI query against a `custom/gitService/...` route. Returns `None`
    /// when the node answers that the repository does not exist.
    fn abci_query<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let result = self
            .rpc("abci_query", json!({ "path": path, "data": "" }))
            .with_context(|| format!("query '{}' failed", path))?;

        let response = &result["response"];
        let code = response["code"].as_u64().unwrap_or(0);
        let log = response["log"].as_str().unwrap_or("");

        if code != 0 {
            if log.contains("not found") {
                return Ok(None);
            }
            return Err(Error::Query(format!("query '{}': {}", path, log)).into());
        }

        let value = response["value"].as_str().unwrap_or("");
        if value.is_empty() {
            return Ok(None);
        }

        let raw = BASE64
            .decode(value)
            .context("query response is not valid base64")?;
        let decoded = serde_json::from_slice(&raw).context("malformed query response")?;
        Ok(Some(decoded))
    }
}

impl Ledger for NodeClient {
    fn query_advertised_references(&self, repo: &RepositoryCoordinate) -> Result<AdvertisedRefs> {
        let path = format!(
            "custom/{}/advertisedReferences/{}",
            MODULE_NAME,
            repo.uri()
        );
        let advertised = self.abci_query(&path)?;
        Ok(advertised.unwrap_or_default())
    }

    fn query_list_refs(&self, uri: &str) -> Result<Vec<String>> {
        let path = format!("custom/{}/listRefs/{}", MODULE_NAME, uri);
        let refs: Option<Vec<String>> = self.abci_query(&path)?;
        Ok(refs.unwrap_or_default())
    }

    fn submit_reference_update(
        &self,
        repo: &RepositoryCoordinate,
        refspecs: &[String],
        packfile: &[u8],
    ) -> Result<()> {
        let author = self
            .author
            .as_deref()
            .ok_or_else(|| Error::Broadcast("no author identity configured".to_string()))?;

        tracing::debug!(
            repo = %repo,
            commands = refspecs.len(),
            pack_bytes = packfile.len(),
            "submitting reference update"
        );

        let msg = json!({
            "type": format!("{}/MsgUpdateReferences", MODULE_NAME),
            "value": {
                "uri": repo.uri(),
                "commands": refspecs,
                "packfile": BASE64.encode(packfile),
                "author": author,
            },
        });
        let tx = BASE64.encode(serde_json::to_vec(&msg)?);

        let result = self
            .rpc("broadcast_tx_commit", json!({ "tx": tx }))
            .map_err(|e| Error::Broadcast(e.to_string()))?;

        // Both the mempool check and the delivery must succeed.
        for phase in ["check_tx", "deliver_tx"] {
            let code = result[phase]["code"].as_u64().unwrap_or(0);
            if code != 0 {
                let log = result[phase]["log"].as_str().unwrap_or("transaction rejected");
                return Err(Error::Broadcast(log.to_string()).into());
            }
        }

        Ok(())
    }
}
