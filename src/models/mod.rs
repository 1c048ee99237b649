pub mod meeting;
pub mod user;

pub use meeting::*;
pub use user::*;
