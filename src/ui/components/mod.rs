pub mod dashboard;
pub mod stats_sidebar;
pub mod today_sessions;
pub mod typing_area;
