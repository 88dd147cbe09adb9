pub mod ask;
pub mod learn;
