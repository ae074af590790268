#[path = "activity.rs"]
mod activity_tables;
#[path = "assets.rs"]
mod assets_tables;
#[path = "customers.rs"]
mod customers_tables;
#[path = "employees.rs"]
mod employees_tables;
#[path = "leave.rs"]
mod leave_tables;
#[path = "maintenance.rs"]
mod maintenance_tables;
#[path = "rnd.rs"]
mod rnd_tables;
#[path = "tasks.rs"]
mod tasks_tables;
#[path = "visits.rs"]
mod visits_tables;

pub use activity_tables::*;
pub use assets_tables::*;
pub use customers_tables::*;
pub use employees_tables::*;
pub use leave_tables::*;
pub use maintenance_tables::*;
pub use rnd_tables::*;
pub use tasks_tables::*;
pub use visits_tables::*;
