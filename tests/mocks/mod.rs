pub mod scripted_provider;
pub mod test_data_generator;

pub use scripted_provider::{ScriptedProvider, ScriptedReading};
pub use test_data_generator::{GeneratorConfig, SampleGenerator};
