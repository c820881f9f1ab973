pub mod classifier;
pub mod client;
pub mod prompt;
pub mod taxonomy;

pub use classifier::Classifier;
pub use client::ChatClient;
pub use taxonomy::Taxonomy;
