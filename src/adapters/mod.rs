pub mod anthropic;
pub mod gemini;
pub mod llm;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAIAdapter;
