use swf_types::TagCode;

/// Configuration for describing a decoded container.
///
/// ```text
/// ┌───────────────┬────────────────────────────────────────────────────┐
/// │ Field         │ Purpose                                            │
/// ├───────────────┼────────────────────────────────────────────────────┤
/// │ mode          │ Selects indented tree or one-line-per-tag output   │
/// │ include_codes │ Optional allowlist of tag codes to describe        │
/// │ show_actions  │ List the actions inside DoAction / DoInitAction    │
/// └───────────────┴────────────────────────────────────────────────────┘
/// ```
///
/// When `include_codes` is `None`, every tag is described. When
/// `Some(codes)`, tags whose code is not listed are skipped at every
/// nesting level; the header is always rendered. FLV tags are never
/// filtered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescribeConfig {
    pub mode: OutputMode,
    pub include_codes: Option<Vec<TagCode>>,
    pub show_actions: bool,
}

impl Default for DescribeConfig {
    /// Tree mode, no filter, actions listed.
    fn default() -> Self {
        Self {
            mode: OutputMode::Tree,
            include_codes: None,
            show_actions: true,
        }
    }
}

impl DescribeConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_codes(mut self, codes: impl IntoIterator<Item = TagCode>) -> Self {
        self.include_codes = Some(codes.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_actions(mut self, show: bool) -> Self {
        self.show_actions = show;
        self
    }

    pub(crate) fn includes(&self, code: TagCode) -> bool {
        self.include_codes
            .as_ref()
            .is_none_or(|codes| codes.contains(&code))
    }
}

/// Output layouts.
///
/// ```text
/// ┌─────────┬──────────────────────────────────────────────────────┐
/// │ Mode    │ Shape of the output                                  │
/// ├─────────┼──────────────────────────────────────────────────────┤
/// │ Tree    │ header fields, then one indented entry per tag;      │
/// │         │ sprite children and actions nest one level deeper    │
/// ├─────────┼──────────────────────────────────────────────────────┤
/// │ Minimal │ one summary line, then one line per top-level tag    │
/// └─────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Tree,
    Minimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_includes_everything() {
        let config = DescribeConfig::default();
        assert!(config.includes(TagCode::ShowFrame));
        assert!(config.includes(TagCode::Unknown(500)));
    }

    #[test]
    fn allowlist_filters() {
        let config = DescribeConfig::default().with_codes([TagCode::DoAction]);
        assert!(config.includes(TagCode::DoAction));
        assert!(!config.includes(TagCode::ShowFrame));
    }
}
