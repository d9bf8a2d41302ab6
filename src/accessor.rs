//! Entity accessor
//!
//! Resolves the named inputs of one operation execution to typed entities
//! and collects the outputs it publishes.

use crate::entity::{DoubleAttribute, EdgeBundle, Entity, VertexSet};
use crate::error::{SphynxError, SphynxResult};
use crate::param::Params;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Published outputs, in publication order
pub type Outputs = IndexMap<String, Arc<Entity>>;

/// Inputs, parameters and outputs of one operation execution
#[derive(Debug, Default)]
pub struct EntityAccessor {
    params: Params,
    inputs: FxHashMap<String, Arc<Entity>>,
    outputs: Outputs,
}

impl EntityAccessor {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Builder-style input binding
    pub fn with_input(mut self, name: impl Into<String>, entity: Arc<Entity>) -> Self {
        self.inputs.insert(name.into(), entity);
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn get_string_param(&self, key: &str) -> SphynxResult<&str> {
        self.params.get_string(key)
    }

    pub fn get_double_param(&self, key: &str) -> SphynxResult<f64> {
        self.params.get_double(key)
    }

    pub fn get_map_param(&self, key: &str) -> SphynxResult<Params> {
        self.params.get_map(key)
    }

    pub fn get_vertex_set(&self, name: &str) -> SphynxResult<&VertexSet> {
        match self.input(name)? {
            Entity::VertexSet(vs) => Ok(vs),
            other => Err(wrong_kind(name, "VertexSet", other)),
        }
    }

    pub fn get_edge_bundle(&self, name: &str) -> SphynxResult<&EdgeBundle> {
        match self.input(name)? {
            Entity::EdgeBundle(es) => Ok(es),
            other => Err(wrong_kind(name, "EdgeBundle", other)),
        }
    }

    /// An absent input is `Ok(None)`; a present input of another kind is
    /// still an error.
    pub fn get_double_attribute_opt(&self, name: &str) -> SphynxResult<Option<&DoubleAttribute>> {
        match self.inputs.get(name).map(|e| e.as_ref()) {
            None => Ok(None),
            Some(Entity::DoubleAttribute(a)) => Ok(Some(a)),
            Some(other) => Err(wrong_kind(name, "DoubleAttribute", other)),
        }
    }

    /// Publish an output. Each name can be published once.
    pub fn output(&mut self, name: &str, entity: impl Into<Entity>) -> SphynxResult<()> {
        if self.outputs.contains_key(name) {
            return Err(SphynxError::DuplicateOutput(name.to_string()));
        }
        self.outputs.insert(name.to_string(), Arc::new(entity.into()));
        Ok(())
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn into_outputs(self) -> Outputs {
        self.outputs
    }

    fn input(&self, name: &str) -> SphynxResult<&Entity> {
        self.inputs
            .get(name)
            .map(|e| e.as_ref())
            .ok_or_else(|| SphynxError::missing_input(name, "not provided"))
    }
}

fn wrong_kind(name: &str, expected: &str, found: &Entity) -> SphynxError {
    SphynxError::missing_input(name, format!("expected {}, found {}", expected, found.kind()))
}
