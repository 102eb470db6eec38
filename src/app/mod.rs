pub mod controller;

pub use controller::{SessionController, SessionSettings};
