//! SeaORM entities, one per table.

pub mod adoption;
pub mod cat;
pub mod session;
pub mod user;
