pub mod records;
pub mod reminders;

pub use records::AdminRecordsService;
pub use reminders::ReminderService;
