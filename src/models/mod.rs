pub mod forecast;
pub mod profile;
pub mod reading;
pub mod recommendation;
pub mod severity;

pub use forecast::*;
pub use profile::*;
pub use reading::*;
pub use recommendation::*;
pub use severity::*;
