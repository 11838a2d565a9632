pub mod hints;
pub mod list;
pub mod run;

pub use hints::*;
pub use list::*;
pub use run::*;
