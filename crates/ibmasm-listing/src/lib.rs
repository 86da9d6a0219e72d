pub mod analyze;
pub mod model;

pub use analyze::{analyze, Edge, EdgeKind, Report, Unresolved};
pub use model::{layout_source, load_source, rows, Row};
