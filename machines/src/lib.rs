pub mod registry;
pub mod testcard;

pub use testcard::TestCard;
