pub mod notification;
pub mod session;
pub mod strategy;
pub mod summary;
pub mod trade;
pub mod user;

pub(crate) mod wire_date;
