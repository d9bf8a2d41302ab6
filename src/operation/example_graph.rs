//! Synthetic four-person example graph

use super::Operation;
use crate::accessor::EntityAccessor;
use crate::entity::{
    DoubleAttribute, DoubleTuple2, DoubleTuple2Attribute, EdgeBundle, StringAttribute, VertexSet,
};
use crate::error::SphynxResult;

/// Builds a fixed graph of four people with a few attributes of each kind.
pub struct ExampleGraph;

impl ExampleGraph {
    pub const NAME: &'static str = "ExampleGraph";
}

impl Operation for ExampleGraph {
    fn execute(&self, ea: &mut EntityAccessor) -> SphynxResult<()> {
        let vertices = VertexSet::with_identity(4);
        let edges = EdgeBundle::from_pairs(&[(0, 1), (1, 0), (2, 0), (2, 1)]);

        let age = DoubleAttribute::fully_defined(vec![20.3, 18.2, 50.3, 2.0]);
        let gender = strings(&["Male", "Female", "Male", "Male"]);
        let income: DoubleAttribute = vec![Some(1000.0), None, None, Some(2000.0)]
            .into_iter()
            .collect();
        let location = DoubleTuple2Attribute::fully_defined(vec![
            DoubleTuple2 { x: 40.71448, y: -74.00598 },     // New York
            DoubleTuple2 { x: 47.5269674, y: 19.0323968 },  // Budapest
            DoubleTuple2 { x: 1.352083, y: 103.819836 },    // Singapore
            DoubleTuple2 { x: -33.8674869, y: 151.2069902 }, // Sydney
        ]);
        let comment = strings(&[
            "Adam loves Eve",
            "Eve loves Adam",
            "Bob envies Adam",
            "Bob loves Eve",
        ]);
        let weight = DoubleAttribute::fully_defined(vec![1.0, 2.0, 3.0, 4.0]);

        ea.output("vertices", vertices)?;
        ea.output("edges", edges)?;
        ea.output("age", age)?;
        ea.output("gender", gender)?;
        ea.output("income", income)?;
        ea.output("location", location)?;
        ea.output("comment", comment)?;
        ea.output("weight", weight)?;
        ea.output("greeting", serde_json::Value::from("Hello world! 😀 "))?;
        Ok(())
    }
}

fn strings(values: &[&str]) -> StringAttribute {
    StringAttribute::fully_defined(values.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::param::Params;

    #[test]
    fn test_example_graph_is_consistent() {
        let mut ea = EntityAccessor::new(Params::new());
        ExampleGraph.execute(&mut ea).unwrap();
        let outputs = ea.into_outputs();

        let vs = match outputs["vertices"].as_ref() {
            Entity::VertexSet(vs) => vs.clone(),
            other => panic!("unexpected {}", other.kind()),
        };
        let es = match outputs["edges"].as_ref() {
            Entity::EdgeBundle(es) => es.clone(),
            other => panic!("unexpected {}", other.kind()),
        };
        assert!(es.validate(&vs, &vs).is_ok());

        for name in ["age", "gender", "income", "location", "comment"] {
            assert_eq!(outputs[name].size(), Some(vs.size()), "{}", name);
        }
        assert_eq!(outputs["weight"].size(), Some(es.size()));

        match outputs["income"].as_ref() {
            Entity::DoubleAttribute(income) => {
                assert_eq!(income.defined, vec![true, false, false, true]);
                assert_eq!(income.get(1), None);
            }
            other => panic!("unexpected {}", other.kind()),
        }
        assert_eq!(outputs["greeting"].kind(), "Scalar");
    }
}
