pub mod apply;
pub mod plan;
pub mod show;
pub mod state;
pub mod validate;
