pub mod normalize;
pub mod rules;
