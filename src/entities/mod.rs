pub mod customer;
pub mod daily_variation;

pub use customer::Entity as Customer;
pub use daily_variation::Entity as DailyVariation;
