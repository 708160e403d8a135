pub mod appointments;
pub mod availability;
pub mod patients;

pub use appointments::GpAppointmentService;
pub use availability::GpAvailabilityService;
pub use patients::PatientDirectoryService;
