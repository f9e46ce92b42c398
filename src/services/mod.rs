pub mod agent_memory;
pub mod failure_writer;
pub mod persistence;
pub mod prompt_loader;

pub use agent_memory::AgentMemory;
pub use failure_writer::FailureWriter;
pub use persistence::PersistenceClient;
pub use prompt_loader::{PromptLoader, PromptTemplate};
