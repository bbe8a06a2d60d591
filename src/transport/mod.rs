pub mod http;
pub mod storefront;
pub mod ws;
