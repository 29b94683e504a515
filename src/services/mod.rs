pub mod auth;
pub mod geolocation;
pub mod images;
pub mod pricing;
pub mod ranking;
