pub mod resource_store;
pub mod session;
pub mod task_service;

pub use resource_store::{DbType, InMemoryResourceStore, ResourceStore};
pub use session::SessionService;
pub use task_service::{TaskService, TaskServiceError};
