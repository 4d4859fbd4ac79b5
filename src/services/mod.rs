pub mod catalog_service;
pub mod evaluator;
pub mod notification_service;
pub mod tracking_service;

pub use catalog_service::{ CatalogService, ShopRefresh };
pub use evaluator::PricePair;
pub use notification_service::{ DispatchOutcome, NotificationService };
pub use tracking_service::TrackingService;
