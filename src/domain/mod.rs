pub mod donation;
pub mod profile;

pub use donation::*;
pub use profile::*;
