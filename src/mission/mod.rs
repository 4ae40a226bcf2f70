pub mod mission_file;
mod navigation;
mod pager;
mod paging_state;
mod store;
#[cfg(test)]
mod tests;
mod waypoint;

pub use navigation::NavStep;
pub use pager::{MissionPager, MissionView, PagingError, WaypointDirection};
pub use paging_state::{PageBounds, PagingState, first_window};
#[cfg(test)]
pub use store::MemoryMissionStore;
pub use store::{FileMissionStore, MissionSnapshot, MissionStore, StoreError};
pub use waypoint::Waypoint;
