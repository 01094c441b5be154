pub mod assignment;
pub mod entry;
pub mod room;
pub mod time_slot;
