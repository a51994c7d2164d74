//! Aggregates module
pub mod account;
pub mod address;
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;

pub use account::{LoginInput, Profile, ProfileUpdate, RegisterInput, SignedIn, Wishlist, WishlistToggle};
pub use address::{Address, AddressInput};
pub use cart::{Cart, CartError, CartLine};
pub use coupon::{Coupon, CouponError, DiscountKind};
pub use order::{LineItem, Order, OrderRequest, OrderStatus, PaymentMethod};
pub use product::{Category, Page, Product, ProductQuery, Variant};
pub use review::{RatingSummary, Review, ReviewInput};
