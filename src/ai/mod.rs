mod summarizer;

pub use summarizer::ChatCompletionClient;
