pub mod chats;
pub mod datasets;
pub mod health;
pub mod users;
