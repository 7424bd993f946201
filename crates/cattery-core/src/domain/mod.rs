//! Domain entities - the core business objects.

mod adoption;
mod cat;
mod pagination;
mod session;
mod user;

pub use adoption::{AdoptedCat, Adoption};
pub use cat::{Cat, CatDraft, CatField, CatPatch, NewCat};
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, PageRequest, Pagination};
pub use session::Session;
pub use user::{
    LoginDraft, LoginKey, MIN_PASSWORD_LEN, NewUser, Registration, RegistrationDraft, User,
    UserIdentity,
};
