pub mod desk_ctx;
pub mod result_desk;

pub use desk_ctx::DeskCtx;
pub use result_desk::{DeskState, ResultDesk};
