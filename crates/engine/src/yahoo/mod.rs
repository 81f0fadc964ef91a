pub mod rest;
pub mod symbol;

pub use rest::YahooClient;
pub use symbol::yahoo_symbol;
