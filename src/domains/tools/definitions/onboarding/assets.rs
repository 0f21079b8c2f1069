//! Embedded provisioning configuration.
//!
//! The Terraform files live under `assets/terraform/` as explicit artifacts
//! and are compiled into the binary, so a single executable can materialize
//! the full configuration into any working directory.

/// Root module.
pub const MAIN_TF: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/terraform/main.tf"));

/// Root module variables.
pub const VARIABLES_TF: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/terraform/variables.tf"
));

/// Integration sources module.
pub const SOURCES_MAIN_TF: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/terraform/modules/platform_sources/main.tf"
));

/// Integration sources module variables.
pub const SOURCES_VARIABLES_TF: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/terraform/modules/platform_sources/variables.tf"
));

/// All provisioning files, as (relative destination, content) pairs.
pub fn provisioning_files() -> [(&'static str, &'static str); 4] {
    [
        ("main.tf", MAIN_TF),
        ("variables.tf", VARIABLES_TF),
        ("modules/platform_sources/main.tf", SOURCES_MAIN_TF),
        ("modules/platform_sources/variables.tf", SOURCES_VARIABLES_TF),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_non_empty() {
        for (dest, content) in provisioning_files() {
            assert!(!content.trim().is_empty(), "{} is empty", dest);
        }
    }

    #[test]
    fn test_root_module_declares_onboarding_resource() {
        assert!(MAIN_TF.contains("null_resource\" \"onboard_organization"));
        assert!(MAIN_TF.contains("token.txt"));
    }

    #[test]
    fn test_sources_module_uses_staged_token() {
        assert!(SOURCES_MAIN_TF.contains("PLATFORM_API_TOKEN"));
    }
}
