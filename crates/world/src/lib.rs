#![warn(missing_docs)]
//! Drink mixer block entity and the world services it talks to.

mod cocktail;
mod drink_mixer;
mod drop_item;
mod host;
mod ingredient;
mod mixer_recipes;
mod persist;
mod sync;

pub use cocktail::*;
pub use drink_mixer::*;
pub use drop_item::*;
pub use host::*;
pub use ingredient::*;
pub use mixer_recipes::*;
pub use persist::*;
pub use sync::*;
