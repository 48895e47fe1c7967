pub mod banguat;
pub mod soap;

pub use banguat::BanguatProvider;
