pub mod dashboard;

pub use dashboard::{Dashboard, MonthlyReport, TradePage};
