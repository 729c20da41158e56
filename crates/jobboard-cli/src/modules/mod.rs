pub(crate) mod auth;
pub(crate) mod employers;
pub(crate) mod progress;
pub(crate) mod system;
pub(crate) mod users;
pub(crate) mod vacancies;
