pub mod bookmarks;
pub mod caches;
pub mod dashboard;
pub mod detail;
pub mod filter;
mod in_flight;
pub mod selection;

pub use bookmarks::{RenderSource, Rendered};
pub use dashboard::{Dashboard, DashboardOptions};
pub use selection::{FilterType, SortBy, ViewMode};
