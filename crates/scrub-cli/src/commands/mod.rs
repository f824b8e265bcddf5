pub mod config;
pub mod serve;
pub mod text;
pub mod ticket;
