pub mod availability;
pub mod booking;
pub mod notice;
pub mod staff;
pub mod wire;

pub use availability::{AvailabilityRecord, CreateDayRequest, CreateRangeRequest, UpdateSlotsRequest};
pub use booking::{Booking, BookingItem, BookingStatus, Customer, ItemKind, Payment, ServiceInfo, TimelineEvent};
pub use notice::{Notice, NoticeKind, NoticeLevel};
pub use staff::Staff;
