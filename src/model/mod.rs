//! Bayesian logistic regression outcome model

pub mod artifact;
mod linalg;
pub mod posterior;
pub mod predictor;
pub mod preprocess;
pub mod sampler;
pub mod spec;

// Re-export commonly used types
pub use artifact::FittedModel;
pub use posterior::{Chain, ParameterSummary, Posterior};
pub use predictor::BettingModel;
pub use preprocess::{MeanImputer, Preprocessor, StandardScaler};
pub use sampler::{sigmoid, SamplerConfig};
pub use spec::{ModelSpec, NormalPrior};
