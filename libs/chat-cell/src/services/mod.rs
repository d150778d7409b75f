pub mod rooms;
pub mod session;

pub use rooms::ChatRooms;
pub use session::run_session;
