mod adapter;
mod models;

pub use adapter::GeminiProvider;
