pub mod assignment;
pub mod checkin;
pub mod geo;
