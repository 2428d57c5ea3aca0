mod avian;
mod backend;
mod character_controller;
mod config;
mod controller;
mod crouch;
mod error;
mod headbob;
mod input;
mod input_plugin;
mod locomotion;
mod look;
mod speed;

pub use avian::*;
pub use backend::*;
pub use character_controller::*;
pub use config::*;
pub use controller::*;
pub use crouch::*;
pub use error::*;
pub use headbob::*;
pub use input::*;
pub use input_plugin::*;
pub use locomotion::*;
pub use look::*;
pub use speed::*;
