//! Entity model
//!
//! The canonical in-process graph representation: vertex sets, edge bundles
//! and attributes over them, all dense-indexed. Entities are created by an
//! operation and never mutated after they are published.

pub mod attribute;
pub mod types;

pub use attribute::{
    Attribute, DoubleAttribute, DoubleTuple2, DoubleTuple2Attribute, LongAttribute,
    StringAttribute,
};
pub use types::{EdgeBundle, SphynxId, VertexSet};

use serde::{Deserialize, Serialize};

/// Any entity an operation can read or publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Entity {
    VertexSet(VertexSet),
    EdgeBundle(EdgeBundle),
    DoubleAttribute(DoubleAttribute),
    LongAttribute(LongAttribute),
    StringAttribute(StringAttribute),
    DoubleTuple2Attribute(DoubleTuple2Attribute),
    Scalar(serde_json::Value),
}

impl Entity {
    /// Kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::VertexSet(_) => "VertexSet",
            Entity::EdgeBundle(_) => "EdgeBundle",
            Entity::DoubleAttribute(_) => "DoubleAttribute",
            Entity::LongAttribute(_) => "LongAttribute",
            Entity::StringAttribute(_) => "StringAttribute",
            Entity::DoubleTuple2Attribute(_) => "DoubleTuple2Attribute",
            Entity::Scalar(_) => "Scalar",
        }
    }

    /// Number of entries, `None` for scalars
    pub fn size(&self) -> Option<usize> {
        match self {
            Entity::VertexSet(vs) => Some(vs.size()),
            Entity::EdgeBundle(es) => Some(es.size()),
            Entity::DoubleAttribute(a) => Some(a.len()),
            Entity::LongAttribute(a) => Some(a.len()),
            Entity::StringAttribute(a) => Some(a.len()),
            Entity::DoubleTuple2Attribute(a) => Some(a.len()),
            Entity::Scalar(_) => None,
        }
    }
}

macro_rules! impl_from_entity {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Entity {
                fn from(v: $ty) -> Self {
                    Entity::$variant(v)
                }
            }
        )*
    };
}

impl_from_entity! {
    VertexSet => VertexSet,
    EdgeBundle => EdgeBundle,
    DoubleAttribute => DoubleAttribute,
    LongAttribute => LongAttribute,
    StringAttribute => StringAttribute,
    DoubleTuple2Attribute => DoubleTuple2Attribute,
    serde_json::Value => Scalar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_and_size() {
        let e: Entity = VertexSet::with_identity(3).into();
        assert_eq!(e.kind(), "VertexSet");
        assert_eq!(e.size(), Some(3));

        let s: Entity = serde_json::json!("hello").into();
        assert_eq!(s.kind(), "Scalar");
        assert_eq!(s.size(), None);
    }

    #[test]
    fn test_entity_json_shape() {
        let e: Entity = EdgeBundle::from_pairs(&[(0, 1)]).into();
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "EdgeBundle");
        assert_eq!(json["data"]["src"], serde_json::json!([0]));

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}
