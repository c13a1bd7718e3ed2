//! Aggregates module
pub mod hierarchy;
pub mod product;
pub mod pack;
pub mod cart;
pub mod fidelity;
pub mod promotion;

pub use hierarchy::{Category, CategoryTree, DEFAULT_CATEGORIES, Family, NewCategory, NewFamily, NewSubfamily, Subfamily, Upserted};
pub use product::{paginate, Page, Product, ProductFilter, PRODUCTS_PER_PAGE};
pub use pack::{Pack, PackError, PackItem, PackSavings};
pub use cart::{Cart, CartError, CartItem, CartQuote, DeliveryPolicy, PackTag};
pub use fidelity::{points_for, FidelityAccount, FidelityEntry, FidelityEntryType, FidelityError, OrderStatus};
pub use promotion::{active_events, check_schedule, current_event, EventError, EventPeriod, PromoEvent};
