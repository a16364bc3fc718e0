pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod store;
pub mod utils;
pub mod workflow;

pub use router::build_router;

#[derive(Clone)]
pub struct AppState {
    pub identity: identity::IdentityService,
    pub workflow: workflow::ContentWorkflow,
}
