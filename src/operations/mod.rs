pub mod blend;
pub mod boolean;
pub mod creation;
pub mod query;
