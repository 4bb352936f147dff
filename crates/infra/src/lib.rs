//! Infrastructure layer: stores and the workflow services built on them.

pub mod store;
pub mod workflow;


pub use store::{StoreError, StoreResult, Stores};
pub use workflow::{
    AccessRequestEngine, AuthGateway, CatalogService, DashboardStats, Reporter, Workflow,
    WorkflowDeps,
};
