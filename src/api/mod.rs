pub mod auth;
pub mod health;
pub mod meetings;
pub mod points;
pub mod recommendations;
pub mod swagger;
pub mod users;
