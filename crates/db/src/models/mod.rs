pub mod article;
pub mod entity;
pub mod link;
pub mod location;
pub mod page;
pub mod product;
pub mod promotion;
