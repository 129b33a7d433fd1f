pub mod insight_llm;
pub mod storage;

pub use insight_llm::{DisabledInsightAdapter, OpenAiInsightAdapter};
pub use storage::JsonFileStorage;
