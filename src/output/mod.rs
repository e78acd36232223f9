// Output generation module

pub mod index;
pub mod pages;
pub mod templates;

pub use index::*;
pub use pages::*;
pub use templates::*;
