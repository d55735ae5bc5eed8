pub mod config;
pub mod error;
pub mod model;
pub mod types;

pub use config::Config;
pub use error::Error;
pub use model::ChatModel;
pub use types::ArticleRecord;

pub type Result<T> = std::result::Result<T, Error>;
