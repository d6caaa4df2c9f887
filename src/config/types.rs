//! Default value functions used by the Config struct.

pub(crate) fn default_store_root() -> String {
    ".varidelta/cache".to_string()
}

pub(crate) fn default_code_extension() -> String {
    crate::store::DEFAULT_EXTENSION.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

/// Files whose changes can affect variability: C sources and headers plus
/// Kconfig and Kbuild/Makefile build descriptions.
pub fn default_variability_file_globs() -> Vec<String> {
    vec![
        "**/*.c".to_string(),
        "**/*.h".to_string(),
        "**/*.S".to_string(),
        "**/Kconfig*".to_string(),
        "**/Makefile*".to_string(),
        "**/Kbuild*".to_string(),
    ]
}
