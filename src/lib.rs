pub mod app;
pub mod pipeline;
pub mod sampler;
pub mod source;

pub use app::SensorringApp;
pub use pipeline::{PipelineError, PipelineMetrics, SamplingPipeline};
pub use sampler::{SampleOutcome, Sampler};
pub use source::{SampleSource, ScriptedSource, SimulatedLdr};
