pub mod booking;
pub mod lifecycle;
pub mod listing;

pub use booking::BookingService;
pub use lifecycle::LifecycleService;
pub use listing::ListingService;
