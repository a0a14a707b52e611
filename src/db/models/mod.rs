pub mod api;
pub mod goal;
pub mod milestone;
pub mod roadmap;
pub mod roadmap_task;
pub mod task;
pub mod user;

pub use api::*;
pub use goal::*;
pub use milestone::*;
pub use roadmap::*;
pub use roadmap_task::*;
pub use task::*;
pub use user::*;
