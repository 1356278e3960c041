pub mod calendar;
pub mod eligibility;
pub mod manual;
pub mod planner;

pub use manual::assign_manually;
pub use planner::run_auto_plan;
