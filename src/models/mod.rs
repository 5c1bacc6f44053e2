pub mod daily_log;
pub mod member;
pub mod report;
pub mod session;

pub use daily_log::DailyLog;
pub use member::MemberSummary;
pub use report::WeeklyReport;
pub use session::Session;
