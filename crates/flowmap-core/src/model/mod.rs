//! Graph and input data model.
//!
//! - [`category`]: the closed classification enums ([`Category`],
//!   [`Group`], [`EdgeKind`]).
//! - [`entity`]: raw graph nodes and edges.
//! - [`workflow`]: lenient views of exported workflow JSON.

pub mod category;
pub mod entity;
pub mod workflow;

pub use category::{Category, EdgeKind, Group, ParseEnumError};
pub use entity::{Entity, RawEdge};
pub use workflow::{NodeRecord, RelationalFunction, RelationalMetadata, RelationalTable, WorkflowRecord};
