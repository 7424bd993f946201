//! Services - one thin function per operation, composed from the ports.

mod adoptions;
mod auth;
mod cats;

pub use adoptions::AdoptionService;
pub use auth::AuthService;
pub use cats::{CatListing, CatService};
