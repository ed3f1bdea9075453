pub mod entities;
pub mod recurrence;
