mod loader;
mod paths;
mod types;

pub use loader::URL_ENV;
pub use paths::CONFIG_PATH_ENV;
pub use types::{normalize_method, Config, PollConfig};
