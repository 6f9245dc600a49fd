//! Menu filtering: field schema, predicate engine, tree reconstruction.

pub mod engine;
pub mod schema;
pub mod tree;

pub use engine::{FieldValue, Filterable, FilterEngine, FilterParams, PARENT_FIELD};
pub use schema::{FieldSpec, FieldType, FilterSchema, Lookup};
pub use tree::{NodeArena, RequestMode, TreeSelection};
