mod handler;
mod model;

pub use handler::{approve, create, list, recent, reject, search, stats};
pub use model::{CreateContentRequest, SearchQuery};
