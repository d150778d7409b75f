pub mod availability;
pub mod degrees;
pub mod doctor;

pub use availability::AvailabilityService;
pub use degrees::DegreeService;
pub use doctor::DoctorService;
