pub mod display;
pub mod input;
pub mod loader;
pub mod machine;
pub mod persistence;
pub mod refresh;
pub mod scheduler;
pub mod session;

