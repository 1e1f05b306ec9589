//! Data models for the session and the census dashboard.
//!
//! - `User`, `Credentials`, `SessionInfo`: login and session records
//! - Endpoint responses: `LabInternetCount`, `ComputersPerStudent`,
//!   `LanWithoutBroadband`, `TabletWithoutLab`, `DashboardSummary`
//! - `DashboardSnapshot`: everything the dashboard screen renders

pub mod dashboard;
pub mod user;

pub use dashboard::{
    sort_by_tablets_desc, ChartPoint, ComputersPerStudent, DashboardSnapshot, DashboardSummary,
    LabInternetCount, LanWithoutBroadband, SchoolRow, SummaryCards, TabletWithoutLab,
    NORTHEAST_TOTAL_SCHOOLS,
};
pub use user::{email_local_part, Credentials, SessionInfo, User};
