mod budget;
mod category;
mod money;
mod transaction;
mod user;

pub use budget::*;
pub use category::*;
pub use money::*;
pub use transaction::*;
pub use user::*;
