pub mod extractors;
pub mod gemini_client;
pub mod openai_client;

pub use extractors::{CompositeExtractor, PdfExtractor, PlainTextExtractor};
pub use gemini_client::{GeminiClient, GeminiConfig};
pub use openai_client::{OpenAiClient, OpenAiConfig};
