pub mod user;
pub mod shop;
pub mod product;
pub mod price_snapshot;
pub mod tracking;
pub mod tracking_member;
pub mod condition;

pub use user::Entity as User;
pub use shop::Entity as Shop;
pub use product::Entity as Product;
pub use price_snapshot::Entity as PriceSnapshot;
pub use tracking::Entity as Tracking;
pub use tracking_member::Entity as TrackingMember;
pub use condition::Entity as TrackingCondition;
