pub mod file_type;
pub mod ollama_client;
pub mod prompts;

pub use file_type::{FileType, sniff_file_type};
pub use ollama_client::OllamaClient;
pub use prompts::PromptBuilder;
