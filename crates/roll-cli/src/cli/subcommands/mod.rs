mod course;
mod export;
mod report;
mod section;
mod session;
mod user;

pub use course::CourseCommands;
pub use export::ExportCommands;
pub use report::ReportCommands;
pub use section::SectionCommands;
pub use session::SessionCommands;
pub use user::UserCommands;
