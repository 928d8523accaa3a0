//! Source registry. Loads all source definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/sources/` is baked into the binary
//! at compile time via [`include_str!`].

use crate::source_def::SourceDefinition;

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[("la_arrests", include_str!("../sources/la_arrests.toml"))];

/// Identifier of the source used when none is specified.
pub const DEFAULT_SOURCE_ID: &str = "la_arrests";

/// Returns every source definition that parses successfully.
///
/// A broken config is logged and skipped rather than taking down the
/// whole registry.
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .filter_map(|(file, toml_str)| match SourceDefinition::from_toml(toml_str) {
            Ok(def) => Some(def),
            Err(e) => {
                log::error!("Failed to parse source config {file}.toml: {e}");
                None
            }
        })
        .collect()
}

/// Looks up a source definition by its identifier.
#[must_use]
pub fn find_source(id: &str) -> Option<SourceDefinition> {
    all_sources().into_iter().find(|s| s.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_def::FetcherConfig;

    #[test]
    fn all_embedded_configs_parse() {
        assert_eq!(all_sources().len(), SOURCE_TOMLS.len());
    }

    #[test]
    fn default_source_is_registered() {
        let src = find_source(DEFAULT_SOURCE_ID).unwrap();
        let FetcherConfig::Socrata {
            api_url,
            date_column,
            page_size,
        } = &src.fetcher;
        assert!(api_url.contains("yru6-6re4"));
        assert_eq!(date_column, "arst_date");
        assert_eq!(*page_size, 50_000);
    }

    #[test]
    fn unknown_source_is_none() {
        assert!(find_source("chicago_pd").is_none());
    }
}
