pub mod prelude;

pub mod assets;
pub mod users;
