pub mod event_logger;
pub mod graph_logger;

pub use event_logger::{current_log_path, EventLogger};
pub use graph_logger::GraphState;
