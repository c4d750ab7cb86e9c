pub mod http_client;
pub mod protocol;

pub use http_client::HttpClient;
