mod scheduler;
mod view_data;

pub use scheduler::{FetchFn, Scheduler};
pub(crate) use view_data::LoadingGuard;
pub use view_data::{Freshness, ViewData};
