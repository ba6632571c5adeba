mod health;
mod url;

pub use health::health_handler;
pub use url::{
    create_url_handler, delete_url_handler, fallback_handler, get_url_handler,
    method_not_allowed_handler, stats_handler, update_url_handler,
};
