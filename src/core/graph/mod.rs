pub mod wait_for_graph;

pub use wait_for_graph::WaitForGraph;
