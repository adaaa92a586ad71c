pub mod http;
pub mod messages;

pub use http::HttpResetMailer;
