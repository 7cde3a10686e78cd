// Model resolution: logical model name -> backend model name + candidate providers

use crate::config::Provider;
use glob::Pattern;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// Backend model name from the first matching route in scan order. It is
    /// used for whichever candidate gets selected, even when that candidate's
    /// own route maps to a different name.
    pub backend_model: String,
    /// Providers with a matching route, in configuration order.
    pub providers: Vec<Provider>,
}

/// Resolve `model` against `providers`.
///
/// Providers with `weight <= 0` are skipped. Each remaining provider
/// contributes at most one candidate: its first enabled route whose pattern
/// matches. Returns `None` when nothing matches.
pub fn resolve_model(model: &str, providers: &[Provider]) -> Option<ResolvedTarget> {
    let mut backend_model: Option<&str> = None;
    let mut candidates = Vec::new();

    for provider in providers.iter().filter(|p| p.weight > 0) {
        let matched = provider
            .models
            .iter()
            .find(|route| route.enabled && matches_model(&route.from, model));

        if let Some(route) = matched {
            backend_model.get_or_insert(route.to.as_str());
            candidates.push(provider.clone());
        }
    }

    backend_model.map(|backend_model| ResolvedTarget {
        backend_model: backend_model.to_string(),
        providers: candidates,
    })
}

/// Glob match of a route pattern against a model name. Malformed patterns
/// never match.
pub fn matches_model(pattern: &str, model: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    Pattern::new(pattern)
        .map(|p| p.matches(model))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelRoute, ProviderKind};

    fn provider(id: &str, weight: i64, routes: Vec<ModelRoute>) -> Provider {
        Provider {
            id: id.to_string(),
            name: id.to_string(),
            kind: ProviderKind::Anthropic,
            base_url: "http://localhost".to_string(),
            api_key: String::new(),
            weight,
            timeout: 0,
            models: routes,
        }
    }

    #[test]
    fn test_glob_pattern_resolution() {
        let providers = vec![provider("a", 1, vec![ModelRoute::new("gpt-4*", "claude-x")])];

        let target = resolve_model("gpt-4*", &providers).unwrap();
        assert_eq!(target.backend_model, "claude-x");
        assert_eq!(target.providers.len(), 1);

        let target = resolve_model("gpt-4o-mini", &providers).unwrap();
        assert_eq!(target.backend_model, "claude-x");

        assert!(resolve_model("gpt-3.5-turbo", &providers).is_none());
    }

    #[test]
    fn test_star_matches_everything() {
        let providers = vec![provider("a", 1, vec![ModelRoute::new("*", "claude-x")])];
        assert!(resolve_model("", &providers).is_some());
        assert!(resolve_model("anything/with/slashes", &providers).is_some());
    }

    #[test]
    fn test_first_enabled_route_wins() {
        let mut disabled = ModelRoute::new("gpt-4o", "disabled-target");
        disabled.enabled = false;
        let providers = vec![provider(
            "a",
            1,
            vec![
                disabled,
                ModelRoute::new("gpt-4?", "first"),
                ModelRoute::new("gpt-4o", "second"),
            ],
        )];

        let target = resolve_model("gpt-4o", &providers).unwrap();
        assert_eq!(target.backend_model, "first");
        assert_eq!(target.providers.len(), 1);
    }

    #[test]
    fn test_zero_weight_providers_are_skipped() {
        let providers = vec![
            provider("off", 0, vec![ModelRoute::new("*", "off-target")]),
            provider("neg", -3, vec![ModelRoute::new("*", "neg-target")]),
            provider("on", 2, vec![ModelRoute::new("*", "on-target")]),
        ];

        let target = resolve_model("m", &providers).unwrap();
        assert_eq!(target.backend_model, "on-target");
        assert_eq!(target.providers.len(), 1);
        assert_eq!(target.providers[0].id, "on");
    }

    #[test]
    fn test_backend_name_comes_from_first_candidate() {
        let providers = vec![
            provider("a", 1, vec![ModelRoute::new("gpt-4o", "claude-a")]),
            provider("b", 1, vec![ModelRoute::new("gpt-*", "claude-b")]),
        ];

        let target = resolve_model("gpt-4o", &providers).unwrap();
        assert_eq!(target.backend_model, "claude-a");
        let ids: Vec<_> = target.providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_pattern_never_matches() {
        assert!(!matches_model("gpt-[", "gpt-["));
        assert!(matches_model("claude-[35]*", "claude-3-opus"));
    }
}
