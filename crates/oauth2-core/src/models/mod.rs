pub mod client;
pub mod error;
pub mod token;

pub use client::*;
pub use error::*;
pub use token::*;
