pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod render;

pub use config::{Config, DataSourceConfig};
pub use datasource::{
    DataSource, DataSourceError, MockDataSource, PositionFilter, PostgrestDataSource,
};
pub use db::{init_db, Repository};
pub use domain::{Decimal, PositionRecord, Ticker};
pub use engine::{PortfolioSummary, TimeRange};
pub use error::AppError;
pub use orchestration::Dashboard;
