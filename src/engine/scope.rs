//! Scoped ownership of engine objects
//!
//! A [`ForeignScope`] holds the engine session for its whole lifetime and
//! records every object it creates. Dropping the scope deletes those objects
//! in reverse order of creation and only then releases the engine lock, on
//! every exit path including `?` returns and unwinding panics.

use crate::error::SphynxResult;
use sphynx_graph_algorithms::{
    Engine, EngineSession, GraphHandle, PartitionHandle, PlmHandle, VectorHandle,
};
use tracing::error;

#[derive(Debug, Clone, Copy)]
enum Foreign {
    Graph(GraphHandle),
    Plm(PlmHandle),
    Partition(PartitionHandle),
    Vector(VectorHandle),
}

pub struct ForeignScope<'e> {
    session: EngineSession<'e>,
    acquired: Vec<Foreign>,
}

impl<'e> ForeignScope<'e> {
    /// Take the engine lock. Blocks while another scope is open.
    pub fn enter(engine: &'e Engine) -> Self {
        Self {
            session: engine.lock(),
            acquired: Vec::new(),
        }
    }

    pub fn session(&self) -> &EngineSession<'e> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EngineSession<'e> {
        &mut self.session
    }

    /// Number of objects this scope will release
    pub fn acquired(&self) -> usize {
        self.acquired.len()
    }

    pub fn new_graph(&mut self, nodes: u64, weighted: bool, directed: bool) -> GraphHandle {
        let g = self.session.new_graph(nodes, weighted, directed);
        self.acquired.push(Foreign::Graph(g));
        g
    }

    pub fn new_plm(&mut self, g: GraphHandle, refine: bool, gamma: f64) -> SphynxResult<PlmHandle> {
        let c = self.session.new_plm(g, refine, gamma)?;
        self.acquired.push(Foreign::Plm(c));
        Ok(c)
    }

    pub fn plm_partition(&mut self, c: PlmHandle) -> SphynxResult<PartitionHandle> {
        let p = self.session.plm_partition(c)?;
        self.acquired.push(Foreign::Partition(p));
        Ok(p)
    }

    pub fn partition_vector(&mut self, p: PartitionHandle) -> SphynxResult<VectorHandle> {
        let v = self.session.partition_vector(p)?;
        self.acquired.push(Foreign::Vector(v));
        Ok(v)
    }
}

impl Drop for ForeignScope<'_> {
    fn drop(&mut self) {
        while let Some(object) = self.acquired.pop() {
            let released = match object {
                Foreign::Graph(g) => self.session.delete_graph(g),
                Foreign::Plm(c) => self.session.delete_plm(c),
                Foreign::Partition(p) => self.session.delete_partition(p),
                Foreign::Vector(v) => self.session.delete_vector(v),
            };
            if let Err(e) = released {
                error!("failed to release engine object {:?}: {}", object, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_on_drop() {
        let engine = Engine::new();
        {
            let mut scope = ForeignScope::enter(&engine);
            let g = scope.new_graph(3, false, true);
            scope.session_mut().add_edge(g, 0, 1, 1.0).unwrap();
            let c = scope.new_plm(g, false, 1.0).unwrap();
            scope.session_mut().run_plm(c).unwrap();
            let p = scope.plm_partition(c).unwrap();
            scope.partition_vector(p).unwrap();
            assert_eq!(scope.acquired(), 4);
            assert_eq!(scope.session().live_objects(), 4);
        }
        assert_eq!(engine.live_objects(), 0);
    }

    #[test]
    fn test_release_on_error_path() {
        fn failing(engine: &Engine) -> SphynxResult<()> {
            let mut scope = ForeignScope::enter(engine);
            let g = scope.new_graph(2, false, true);
            // Partition before running is an engine fault
            let c = scope.new_plm(g, false, 1.0)?;
            scope.plm_partition(c)?;
            Ok(())
        }

        let engine = Engine::new();
        assert!(failing(&engine).is_err());
        assert_eq!(engine.live_objects(), 0);
    }

    #[test]
    fn test_release_on_panic() {
        let engine = Engine::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = ForeignScope::enter(&engine);
            scope.new_graph(2, false, true);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(engine.live_objects(), 0);
    }
}
