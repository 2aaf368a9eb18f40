// Library entry exposing the preprocessor modules.
pub mod core;
pub mod preprocess;
pub mod registry_defaults;
