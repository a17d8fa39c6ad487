pub mod plugin_error;
pub mod roster_error;
