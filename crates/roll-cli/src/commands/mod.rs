pub mod audit;
pub mod config;
pub mod course;
pub mod dispatch;
pub mod enroll;
pub mod export;
pub mod mark;
pub mod report;
pub mod section;
pub mod session;
pub mod shared;
pub mod user;
