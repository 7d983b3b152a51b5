/// OpenAI chat-completions integration.
pub mod openai;
