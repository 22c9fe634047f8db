mod launch;
mod money;
mod user;
mod validation;

pub use launch::*;
pub use money::*;
pub use user::*;
pub use validation::*;
