pub mod analysis;
pub mod attendance;
pub mod chat;
