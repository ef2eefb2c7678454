//! Swarm membership and cluster configuration
//!
//! There is no swarm entity: a client only ever talks about the cluster the
//! contacted engine belongs to, so every call lives on [`SwarmApi`].

use crate::catalog::{execute_json, Operation, RequestParams};
use crate::engine::EngineClient;
use crate::error::Result;
use crate::models::{
    SwarmInfo, SwarmInitRequest, SwarmJoinRequest, SwarmSpec, SwarmUnlockRequest,
    SwarmUpdateOptions, UnlockKeyResponse,
};

#[derive(Debug, Clone)]
pub struct SwarmApi {
    client: EngineClient,
}

impl SwarmApi {
    pub fn new(client: EngineClient) -> Self {
        Self { client }
    }

    /// Current cluster descriptor, including `Version.Index` and join tokens.
    /// Fails with 503 when the engine is not part of a swarm.
    pub async fn inspect(&self) -> Result<SwarmInfo> {
        execute_json(&self.client, Operation::SwarmInspect, RequestParams::new()).await
    }

    /// Bootstrap a new swarm on the contacted engine; returns the node id
    pub async fn init(&self, request: &SwarmInitRequest) -> Result<String> {
        tracing::info!("initializing swarm on {}", request.listen_addr);
        let params = RequestParams::new().body(request)?;
        execute_json(&self.client, Operation::SwarmInit, params).await
    }

    /// Join an existing swarm.
    ///
    /// A 503 answer (target unreachable or not an active manager) is an
    /// expected outcome; check it with [`crate::Error::is_unavailable`].
    pub async fn join(&self, request: &SwarmJoinRequest) -> Result<()> {
        tracing::info!("joining swarm via {:?}", request.remote_addrs);
        let params = RequestParams::new().body(request)?;
        self.client.execute(Operation::SwarmJoin, params).await?;
        Ok(())
    }

    /// Leave the swarm. `force` is required for the last manager.
    pub async fn leave(&self, force: bool) -> Result<()> {
        tracing::info!("leaving swarm (force={})", force);
        let params = RequestParams::new().query_opt("force", force.then_some(true));
        self.client.execute(Operation::SwarmLeave, params).await?;
        Ok(())
    }

    /// Replace the swarm spec and optionally rotate tokens or the unlock key
    pub async fn update(&self, options: &SwarmUpdateOptions, spec: &SwarmSpec) -> Result<()> {
        tracing::info!("updating swarm at version {}", options.version);
        let params = RequestParams::new()
            .query("version", options.version)
            .query_opt("rotateWorkerToken", options.rotate_worker_token.then_some(true))
            .query_opt("rotateManagerToken", options.rotate_manager_token.then_some(true))
            .query_opt(
                "rotateManagerUnlockKey",
                options.rotate_manager_unlock_key.then_some(true),
            )
            .body(spec)?;
        self.client.execute(Operation::SwarmUpdate, params).await?;
        Ok(())
    }

    /// Current unlock key; empty when auto-lock is off
    pub async fn unlock_key(&self) -> Result<String> {
        let resp: Option<UnlockKeyResponse> =
            execute_json(&self.client, Operation::SwarmUnlockKey, RequestParams::new()).await?;
        Ok(resp.map(|r| r.unlock_key).unwrap_or_default())
    }

    /// Unlock a locked manager. Fails with 409 when the swarm is not locked.
    pub async fn unlock(&self, key: &str) -> Result<()> {
        tracing::info!("unlocking swarm");
        let params = RequestParams::new().body(&SwarmUnlockRequest {
            unlock_key: key.to_string(),
        })?;
        self.client.execute(Operation::SwarmUnlock, params).await?;
        Ok(())
    }
}
