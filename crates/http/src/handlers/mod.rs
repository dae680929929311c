pub mod actions;
pub mod automation;
pub mod designs;
