//! HTTP request domain types

mod method;
mod prepared;
mod query;
mod template;

pub use method::HttpMethod;
pub use prepared::{DEFAULT_TIMEOUT_MS, PreparedRequest, join_path, parse_base_url};
pub use query::{QueryParam, QueryParams};
pub use template::PathTemplate;
