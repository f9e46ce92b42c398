pub mod context;
pub mod nodes;
pub mod stage;

pub use context::WorkflowContext;
pub use nodes::{ClassifierNode, FormatterNode, InfoFetcherNode, Node, TrackerNode};
pub use stage::Stage;
