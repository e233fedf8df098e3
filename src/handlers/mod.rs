pub mod assistant;
pub mod billing;
pub mod customers;
pub mod variations;

use serde::Deserialize;
use utoipa::IntoParams;

/// `?month=&year=` query shared by the monthly reports
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct MonthQuery {
    /// Calendar month, 1-12
    pub month: u32,
    pub year: i32,
}
