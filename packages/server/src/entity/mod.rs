pub mod chat;
pub mod csv;
pub mod room;
pub mod user;
