//! Error types for collapse groups and items.

/// Result type alias for collapse operations.
pub type Result<T> = std::result::Result<T, CollapseError>;

/// Errors that can occur when configuring a collapse group or item.
///
/// Runtime conditions of an item (no registry, zero-height content, stale
/// transition notifications, disabled activation) are not errors; the item
/// absorbs them and stays in a consistent state.
#[derive(Debug, thiserror::Error)]
pub enum CollapseError {
    /// The active names do not match the group's mode.
    #[error("{}", active_names_message(*accordion))]
    ActiveNamesMismatch {
        /// Whether the group is in accordion mode.
        accordion: bool,
    },

    /// An item configuration could not be parsed.
    #[error("Invalid collapse item configuration: {source}")]
    Config {
        #[source]
        source: toml::de::Error,
    },
}

fn active_names_message(accordion: bool) -> &'static str {
    if accordion {
        "Active names must be a single name in accordion mode"
    } else {
        "Active names must be a list in non-accordion mode"
    }
}

impl CollapseError {
    /// Create a mode mismatch error.
    pub fn active_names_mismatch(accordion: bool) -> Self {
        Self::ActiveNamesMismatch { accordion }
    }
}

impl From<toml::de::Error> for CollapseError {
    fn from(source: toml::de::Error) -> Self {
        Self::Config { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = CollapseError::active_names_mismatch(true);
        assert_eq!(
            err.to_string(),
            "Active names must be a single name in accordion mode"
        );
        let err = CollapseError::active_names_mismatch(false);
        assert!(err.to_string().contains("list"));
    }
}
