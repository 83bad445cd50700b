pub mod error;
pub mod retry;
pub mod workflow;

pub use error::OrderError;
pub use retry::RetryConfig;
pub use workflow::CreateOrderWorkflow;
