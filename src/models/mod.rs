pub mod user;

pub use user::{User, UserChange, UserFilter, UserView};
