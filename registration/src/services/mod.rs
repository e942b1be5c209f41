pub mod cookies;
pub mod graphql;
pub mod http;
pub mod navigation;
