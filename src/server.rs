//! Operation server
//!
//! Executes operation requests against an in-memory entity cache. Entities
//! are addressed by GUID; a request names the GUIDs of its inputs and the
//! GUIDs its outputs should be stored under.

use crate::accessor::EntityAccessor;
use crate::config::SphynxConfig;
use crate::entity::Entity;
use crate::error::{SphynxError, SphynxResult};
use crate::operation::OperationRegistry;
use crate::param::Params;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sphynx_graph_algorithms::Engine;
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info};

/// One operation invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Identifies this invocation; unmapped outputs are stored under
    /// `<guid>/<output name>`
    pub guid: String,
    pub operation: String,
    #[serde(default)]
    pub params: Params,
    /// Input name -> entity GUID
    #[serde(default)]
    pub inputs: IndexMap<String, String>,
    /// Output name -> entity GUID
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

impl OperationRequest {
    pub fn new(guid: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            operation: operation.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, guid: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), guid.into());
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, guid: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), guid.into());
        self
    }

    fn output_guid(&self, name: &str) -> String {
        match self.outputs.get(name) {
            Some(guid) => guid.clone(),
            None => format!("{}/{}", self.guid, name),
        }
    }
}

/// GUID -> published entity
#[derive(Default)]
pub struct EntityCache {
    entities: RwLock<FxHashMap<String, Arc<Entity>>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, guid: &str) -> Option<Arc<Entity>> {
        self.entities.read().await.get(guid).cloned()
    }

    pub async fn insert(&self, guid: impl Into<String>, entity: Arc<Entity>) {
        self.entities.write().await.insert(guid.into(), entity);
    }

    /// Drop an entity. Holders of the `Arc` keep their copy.
    pub async fn remove(&self, guid: &str) -> Option<Arc<Entity>> {
        self.entities.write().await.remove(guid)
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

pub struct Server {
    config: SphynxConfig,
    registry: Arc<OperationRegistry>,
    cache: EntityCache,
    permits: Semaphore,
}

impl Server {
    /// Server with the built-in operations on the given engine
    pub fn new(config: SphynxConfig, engine: Arc<Engine>) -> SphynxResult<Self> {
        let registry = OperationRegistry::with_builtins(engine, &config.engine)?;
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: SphynxConfig, registry: OperationRegistry) -> SphynxResult<Self> {
        config.validate()?;
        let permits = Semaphore::new(config.server.max_concurrent_operations);
        Ok(Self {
            config,
            registry: Arc::new(registry),
            cache: EntityCache::new(),
            permits,
        })
    }

    pub fn config(&self) -> &SphynxConfig {
        &self.config
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Store an entity, e.g. one loaded from outside the server
    pub async fn put(&self, guid: impl Into<String>, entity: impl Into<Entity>) {
        self.cache.insert(guid, Arc::new(entity.into())).await;
    }

    pub async fn entity(&self, guid: &str) -> Option<Arc<Entity>> {
        self.cache.get(guid).await
    }

    /// Forget an entity once no later request needs it
    pub async fn remove(&self, guid: &str) -> Option<Arc<Entity>> {
        let removed = self.cache.remove(guid).await;
        if removed.is_some() {
            debug!("removed entity {}", guid);
        }
        removed
    }

    /// Execute one request and return output name -> stored GUID.
    ///
    /// Nothing is stored unless the operation succeeds.
    pub async fn execute(&self, request: OperationRequest) -> SphynxResult<IndexMap<String, String>> {
        if !self.registry.contains(&request.operation) {
            return Err(SphynxError::UnknownOperation(request.operation));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SphynxError::ServerClosed)?;

        let mut ea = EntityAccessor::new(request.params.clone());
        for (name, guid) in &request.inputs {
            let entity = self.cache.get(guid).await.ok_or_else(|| {
                SphynxError::missing_input(name.as_str(), format!("no entity with guid {}", guid))
            })?;
            ea = ea.with_input(name.as_str(), entity);
        }

        debug!(
            "request {}: {} with {} inputs",
            request.guid,
            request.operation,
            request.inputs.len()
        );
        let registry = Arc::clone(&self.registry);
        let operation = request.operation.clone();
        let outputs = tokio::task::spawn_blocking(move || registry.execute(&operation, ea))
            .await
            .map_err(|e| SphynxError::HandlerPanicked(e.to_string()))??;

        let mut stored = IndexMap::with_capacity(outputs.len());
        for (name, entity) in outputs {
            let guid = request.output_guid(&name);
            self.cache.insert(guid.clone(), entity).await;
            stored.insert(name, guid);
        }
        info!(
            "request {} stored {} outputs of {}",
            request.guid,
            stored.len(),
            request.operation
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::VertexSet;

    fn server() -> Server {
        Server::new(SphynxConfig::default(), Arc::new(Engine::new())).unwrap()
    }

    #[tokio::test]
    async fn test_example_graph_outputs_are_stored() {
        let server = server();
        let stored = server
            .execute(OperationRequest::new("g1", "ExampleGraph").with_output("vertices", "people"))
            .await
            .unwrap();

        assert_eq!(stored["vertices"], "people");
        assert_eq!(stored["edges"], "g1/edges");
        assert_eq!(server.entity("people").await.unwrap().size(), Some(4));
        assert!(server.entity("g1/weight").await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_operation_reported_before_inputs() {
        let server = server();
        let request = OperationRequest::new("x", "DoesNotExist").with_input("vs", "nowhere");
        assert_eq!(
            server.execute(request).await,
            Err(SphynxError::UnknownOperation("DoesNotExist".to_string()))
        );
    }

    #[tokio::test]
    async fn test_remove_entity() {
        let server = server();
        server
            .execute(OperationRequest::new("g", "ExampleGraph"))
            .await
            .unwrap();
        let held = server.entity("g/vertices").await.unwrap();

        assert!(server.remove("g/vertices").await.is_some());
        assert!(server.entity("g/vertices").await.is_none());
        assert!(server.remove("g/vertices").await.is_none());
        assert_eq!(held.size(), Some(4));

        let request = OperationRequest::new("c", "NetworKitCommunityDetection")
            .with_params(
                Params::new()
                    .with("op", "PLM")
                    .with("options", Params::new().with("gamma", 1.0)),
            )
            .with_input("vs", "g/vertices")
            .with_input("es", "g/edges");
        assert!(matches!(
            server.execute(request).await,
            Err(SphynxError::MissingInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_input_guid() {
        let server = server();
        let request = OperationRequest::new("r", "NetworKitCommunityDetection")
            .with_input("vs", "nowhere");
        assert!(matches!(
            server.execute(request).await,
            Err(SphynxError::MissingInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_failure_stores_nothing() {
        let server = server();
        server.put("vs", VertexSet::with_identity(3)).await;
        let request = OperationRequest::new("r", "NetworKitCommunityDetection")
            .with_params(Params::new().with("op", "NOT_PLM"))
            .with_input("vs", "vs");

        assert_eq!(
            server.execute(request).await,
            Err(SphynxError::UnsupportedAlgorithm("NOT_PLM".to_string()))
        );
        assert!(server.entity("r/partitions").await.is_none());
    }

    #[test]
    fn test_request_from_json() {
        let request: OperationRequest = serde_json::from_str(
            r#"{
                "guid": "abc",
                "operation": "NetworKitCommunityDetection",
                "params": {"op": "PLM", "options": {"gamma": 1.0}},
                "inputs": {"vs": "v-guid", "es": "e-guid"}
            }"#,
        )
        .unwrap();
        assert_eq!(request.inputs["es"], "e-guid");
        assert!(request.outputs.is_empty());
        assert_eq!(request.params.get_string("op").unwrap(), "PLM");
        assert_eq!(request.output_guid("belongsTo"), "abc/belongsTo");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SphynxConfig::default();
        config.server.max_concurrent_operations = 0;
        assert!(Server::with_registry(config, OperationRegistry::new()).is_err());
    }
}
