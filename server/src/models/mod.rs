pub mod admin;
pub mod booking;
pub mod event;
pub mod project;
pub mod translations;

pub use admin::AdminContext;
pub use booking::{Booking, NewBooking};
pub use event::{Access, Event, EventContent, EventPage, EventView, SeatSummary};
pub use project::{Project, ProjectContent, ProjectView};
pub use translations::{Locale, Translations};
