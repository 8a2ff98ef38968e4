pub mod reconciler;
pub mod sync_model;
pub mod sync_service;

pub use reconciler::Reconciler;
pub use sync_model::SyncResult;
pub use sync_service::SyncService;
