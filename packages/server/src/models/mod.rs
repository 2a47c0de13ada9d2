pub mod chat;
pub mod dataset;
pub mod health;
pub mod shared;
pub mod user;
