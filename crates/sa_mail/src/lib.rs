pub mod fetcher;
pub mod mime;

pub use fetcher::MailFetcher;
