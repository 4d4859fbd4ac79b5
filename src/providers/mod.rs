pub mod crawl_adapter;
pub mod notifier;

pub use crawl_adapter::{ CommerceFields, CrawlAdapter, ProductListing };
pub use notifier::{ EmailMessage, Notifier };
