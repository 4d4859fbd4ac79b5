pub mod config;
pub mod enums;
pub mod error;
pub mod db;
pub mod providers;
pub mod crawler;
pub mod mailer;
pub mod services;
pub mod price_checker;
pub mod scheduler;
pub mod api;
pub mod utils;

pub use config::Config;
pub use enums::{ Condition, ConditionKind };
pub use error::{ AppError, Result };
