pub mod document_store;
pub mod email_client;
pub mod llm_client;
pub mod mongo_client;
pub mod translator_client;

pub use document_store::{DocumentStore, InMemoryDocumentStore};
pub use email_client::{EmailClient, EmailReceipt};
pub use llm_client::{LlmClient, TextGenerator};
pub use mongo_client::MongoStore;
pub use translator_client::{GoogleTranslator, Translator};
