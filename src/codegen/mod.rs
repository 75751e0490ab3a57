pub mod descriptor;
pub mod embed;
pub mod interface;
pub mod loader;
pub mod names;
