//! Repository modules. Each adds methods to [`crate::service::RollService`].

pub mod attendance;
pub mod audit;
pub mod directory;
pub mod export;
pub mod report;
pub mod session;
