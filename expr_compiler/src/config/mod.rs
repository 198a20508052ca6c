//! Configuration for the expression compiler
//!
//! Compile-time limits come from `config/<profile>.toml` through `build.rs`;
//! runtime preferences come from `EXPR_*` environment variables.

// Generated at build time from the TOML profile
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{BatchPreferences, ErrorTarget, LogLevel, LoggingPreferences, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Profile used during build
    pub fn profile() -> &'static str {
        option_env!("EXPR_BUILD_PROFILE").unwrap_or("development")
    }

    /// Configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("EXPR_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn generated_limits_are_consistent() {
        assert!(compile_time::lexical::MAX_STRING_SIZE <= compile_time::lexical::MAX_EXPRESSION_LENGTH);
        assert!(compile_time::syntax::MAX_PARSE_DEPTH > 0);
        assert!(compile_time::compile::MAX_NAME_STACK_DEPTH > 0);
        assert!(compile_time::batch_processing::MAX_WORKER_THREADS > 0);
    }

    #[test]
    fn build_info_names_profile_file() {
        let info = super::build_info::source_info();
        assert!(info.ends_with(".toml"));
        assert!(info.contains(super::build_info::profile()));
    }
}
