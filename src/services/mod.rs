pub mod availability_editor;
pub mod backend;
pub mod booking_detail;
pub mod derive;
pub mod lifecycle;
pub mod notices;
pub mod staff;
