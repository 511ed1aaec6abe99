//! Value objects - Immutable objects defined by their attributes

mod description;
mod prompt_template;
mod settings;

pub use description::{creature_summary, DescriptionRecord};
pub use prompt_template::{PromptTemplate, DEFAULT_PROMPT_TEMPLATE};
pub use settings::{
    EndpointConfig, ModuleSettings, DEFAULT_API_ENDPOINT, DEFAULT_MODEL, MASKED_SECRET,
};
