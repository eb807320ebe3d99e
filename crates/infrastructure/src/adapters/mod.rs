//! Infrastructure adapters

mod reqwest_client;
mod system_clock;

pub use reqwest_client::{DEFAULT_USER_AGENT, MAX_REDIRECTS, ReqwestHttpClient};
pub use system_clock::SystemClock;
