//! Build metadata baked in at compile time.
//!
//! `name` and `version` come from the package manifest. `build` is read from the
//! `APPVISOR_BUILD` environment variable while compiling (for example a commit
//! hash set by CI) and is empty when the variable is unset.

/// Package name.
pub fn name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

/// Package version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build identifier, or `""` if none was provided.
pub fn build() -> &'static str {
    option_env!("APPVISOR_BUILD").unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_values_are_exposed() {
        assert_eq!(name(), "appvisor");
        assert!(!version().is_empty());
        assert_eq!(build(), option_env!("APPVISOR_BUILD").unwrap_or(""));
    }
}
