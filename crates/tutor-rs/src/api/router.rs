//! Ordered model preference list for the generation fallback loop.

use crate::DEFAULT_MODELS;

/// Model identifiers in preference order.
///
/// [`GenerationClient`](super::GenerationClient) tries each in turn until one
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain(Vec<String>);

impl ModelChain {
    /// Build a chain, dropping blank and duplicate entries while keeping order.
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut chain: Vec<String> = Vec::new();
        for model in models {
            let model = model.into().trim().to_string();
            if !model.is_empty() && !chain.contains(&model) {
                chain.push(model);
            }
        }
        Self(chain)
    }

    /// Parse a comma-separated list, e.g. `"model-a, model-b"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// A chain with a single model.
    pub fn single(model: impl Into<String>) -> Self {
        Self::new([model.into()])
    }

    /// The preferred model, if any.
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl Default for ModelChain {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_model() {
        let chain = ModelChain::single("gemini-flash");
        assert_eq!(chain.primary(), Some("gemini-flash"));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn parse_keeps_order_and_trims() {
        let chain = ModelChain::parse(" pro , flash,lite ");
        assert_eq!(chain.iter().collect::<Vec<_>>(), vec!["pro", "flash", "lite"]);
    }

    #[test]
    fn parse_drops_blanks_and_duplicates() {
        let chain = ModelChain::parse("pro,,flash,pro, ");
        assert_eq!(chain.to_vec(), vec!["pro".to_string(), "flash".to_string()]);
    }

    #[test]
    fn empty_list_is_empty() {
        assert!(ModelChain::parse(" , ").is_empty());
        assert_eq!(ModelChain::parse("").primary(), None);
    }

    #[test]
    fn default_uses_builtin_models() {
        let chain = ModelChain::default();
        assert_eq!(chain.len(), DEFAULT_MODELS.len());
        assert_eq!(chain.primary(), Some(DEFAULT_MODELS[0]));
    }
}
