pub mod checkin;
pub mod client;
pub mod role;
pub mod user;
