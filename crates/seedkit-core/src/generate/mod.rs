//! Row generation: builds a [`plan::GenerationPlan`] from a classified schema
//! and executes it into [`engine::GeneratedData`], routing foreign keys
//! through [`foreign_key::ForeignKeyPool`] and enforcing uniqueness via
//! [`unique::UniqueTracker`].

pub mod correlated;
pub mod custom;
pub mod engine;
pub mod foreign_key;
pub mod plan;
pub mod providers;
pub mod unique;
pub mod value;

pub use engine::{execute_plan, execute_plan_with_fk_pool, GeneratedData};
pub use foreign_key::ForeignKeyPool;
pub use plan::{GenerationPlan, GenerationStrategy};
pub use value::Value;
