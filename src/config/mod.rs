pub mod api;

pub use api::{get_api_config, ApiConfig, API_URL_ENV, DEFAULT_API_URL};
