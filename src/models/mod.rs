pub mod admin;
pub mod location;
pub mod venue;

pub use admin::{AdminVenue, CourtType, VenueFields, VenueInput};
pub use location::{Coordinate, ObserverLocation};
pub use venue::{TimeSlot, Venue, VenueDetail, WeeklySlots};
