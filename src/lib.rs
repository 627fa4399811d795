pub mod config;
pub mod controller;
pub mod dashboard;
pub mod errors;
pub mod guard;
pub mod interrupt;
pub mod project;
pub mod state;
pub mod supervisor;
pub mod tail;
pub mod tasks;
