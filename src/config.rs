mod error;
mod io;
mod settings;


pub use error::{ConfigError, Result};
pub use io::{load_config, load_or_default, save_config};
pub use settings::{
    AnalysisConfig, AppConfig, DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL,
    GeneSearchConfig, NarrativeConfig, SlideConfig,
};
