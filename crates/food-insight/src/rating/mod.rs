//! Health-rating engine.
//!
//! Pipeline: category detection → nutrient and ingredient analysis →
//! baseline macro scoring → sequential blending and post-validation. All
//! stages are synchronous pure functions over in-memory data; the only
//! state the engine carries is its time source.

mod baseline;
mod category;
pub mod domain;
mod engine;
mod ingredients;
mod nutrients;
pub mod tables;

#[cfg(test)]
mod tests;

pub use category::EffectiveProfile;
pub use domain::{
    AnalysisResult, EngineError, IngredientList, ProductId, ProductSnapshot, RatingColor,
    RatingError, RatingLabel,
};
pub use engine::RatingEngine;

#[cfg(test)]
pub(crate) use category::detect_profile;
