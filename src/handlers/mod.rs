pub mod user_handlers;

pub use user_handlers::{get_user_handler, list_users_handler};
