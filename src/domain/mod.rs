pub mod models;
pub mod robot_state;
pub mod settings;
pub mod wire;
