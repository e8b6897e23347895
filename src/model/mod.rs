pub mod attendance;
pub mod class;
pub mod notification;
pub mod profile;
pub mod role;
pub mod status;
