pub mod commands;
pub mod events;
pub mod image;
pub mod models;
pub mod operations;
pub mod schema;
pub mod shapes;
