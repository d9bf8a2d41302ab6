//! Operation registry
//!
//! Maps operation names to handlers. A handler reads its inputs and
//! parameters through an [`EntityAccessor`] and publishes outputs through the
//! same accessor. Execution is the single error boundary: handler errors and
//! handler panics both come back as a [`SphynxError`], and outputs are only
//! handed out when the handler succeeded.

pub mod community_detection;
pub mod example_graph;

pub use community_detection::CommunityDetection;
pub use example_graph::ExampleGraph;

use crate::accessor::{EntityAccessor, Outputs};
use crate::config::EngineConfig;
use crate::error::{SphynxError, SphynxResult};
use indexmap::IndexMap;
use sphynx_graph_algorithms::Engine;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// An executable operation
pub trait Operation: Send + Sync {
    fn execute(&self, ea: &mut EntityAccessor) -> SphynxResult<()>;
}

impl<F> Operation for F
where
    F: Fn(&mut EntityAccessor) -> SphynxResult<()> + Send + Sync,
{
    fn execute(&self, ea: &mut EntityAccessor) -> SphynxResult<()> {
        self(ea)
    }
}

/// Name -> operation
#[derive(Default)]
pub struct OperationRegistry {
    operations: IndexMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in operation. Call once at startup.
    pub fn with_builtins(engine: Arc<Engine>, config: &EngineConfig) -> SphynxResult<Self> {
        let mut registry = Self::new();
        registry.register(ExampleGraph::NAME, ExampleGraph)?;
        registry.register(
            CommunityDetection::NAME,
            CommunityDetection::new(engine, config.threads),
        )?;
        Ok(registry)
    }

    /// Register an operation. A name can only be registered once.
    pub fn register(&mut self, name: &str, operation: impl Operation + 'static) -> SphynxResult<()> {
        if self.operations.contains_key(name) {
            return Err(SphynxError::DuplicateOperation(name.to_string()));
        }
        debug!("registered operation {}", name);
        self.operations.insert(name.to_string(), Arc::new(operation));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(|k| k.as_str())
    }

    /// Run the named operation and return what it published
    pub fn execute(&self, name: &str, mut ea: EntityAccessor) -> SphynxResult<Outputs> {
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| SphynxError::UnknownOperation(name.to_string()))?;

        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| operation.execute(&mut ea)));

        match result {
            Ok(Ok(())) => {
                info!(
                    "operation {} finished in {:?} with {} outputs",
                    name,
                    started.elapsed(),
                    ea.outputs().len()
                );
                Ok(ea.into_outputs())
            }
            Ok(Err(e)) => {
                error!("operation {} failed: {}", name, e);
                Err(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("operation {} panicked: {}", name, message);
                Err(SphynxError::HandlerPanicked(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
