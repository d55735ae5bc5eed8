pub mod generator;
pub mod openai;
pub mod prompt;
pub mod report;

pub use generator::DigestGenerator;
pub use openai::OpenAiModel;
pub use report::write_report;
