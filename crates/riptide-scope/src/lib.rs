//! Scope Engine: decides whether a canonical URL is in or out of scope for
//! a crawl, using structural hostname matching (never regex translation).

use riptide_types::{ScopePolarity, ScopeRule, ScopeRuleKind};
use thiserror::Error;

/// Failure parsing a scope pattern.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("empty scope pattern")]
    EmptyPattern,
    #[error("scope pattern has no base host: {0}")]
    MissingBase(String),
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// In/out decision for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    In,
    Out,
}

/// Full explanation of a scope decision, naming every rule that matched.
#[derive(Debug, Clone)]
pub struct ScopeExplanation {
    pub decision: Decision,
    pub matched_include_rules: Vec<ScopeRule>,
    pub matched_exclude_rules: Vec<ScopeRule>,
}

/// A set of include/exclude host-pattern rules. Exclusion is absolute: any
/// exclude match forces `Out` regardless of includes. Rule insertion order
/// never affects the decision.
#[derive(Debug, Clone, Default)]
pub struct ScopeEngine {
    includes: Vec<ScopeRule>,
    excludes: Vec<ScopeRule>,
}

impl ScopeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from already-structural rules (e.g. a loaded
    /// checkpoint's `scope_rules`), splitting by polarity without
    /// re-parsing pattern strings.
    pub fn from_rules(rules: Vec<ScopeRule>) -> Self {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for rule in rules {
            match rule.polarity {
                ScopePolarity::Include => includes.push(rule),
                ScopePolarity::Exclude => excludes.push(rule),
            }
        }
        Self { includes, excludes }
    }

    /// Add an include rule, parsing `pattern` into its structural kind.
    pub fn add_include(&mut self, pattern: &str) -> Result<(), ScopeError> {
        self.includes.push(parse_rule(pattern, ScopePolarity::Include)?);
        Ok(())
    }

    /// Add an exclude rule, parsing `pattern` into its structural kind.
    pub fn add_exclude(&mut self, pattern: &str) -> Result<(), ScopeError> {
        self.excludes.push(parse_rule(pattern, ScopePolarity::Exclude)?);
        Ok(())
    }

    /// Decide whether `url` is in scope.
    pub fn decide(&self, url: &str) -> Result<Decision, ScopeError> {
        Ok(self.explain(url)?.decision)
    }

    /// All configured rules (includes then excludes), for checkpointing.
    pub fn rules(&self) -> Vec<ScopeRule> {
        self.includes
            .iter()
            .chain(self.excludes.iter())
            .cloned()
            .collect()
    }

    /// Decide and explain which rules matched.
    pub fn explain(&self, url: &str) -> Result<ScopeExplanation, ScopeError> {
        let host = extract_host(url)?;

        let matched_exclude_rules: Vec<ScopeRule> = self
            .excludes
            .iter()
            .filter(|r| rule_matches(r, &host))
            .cloned()
            .collect();

        if !matched_exclude_rules.is_empty() {
            return Ok(ScopeExplanation {
                decision: Decision::Out,
                matched_include_rules: Vec::new(),
                matched_exclude_rules,
            });
        }

        let matched_include_rules: Vec<ScopeRule> = self
            .includes
            .iter()
            .filter(|r| rule_matches(r, &host))
            .cloned()
            .collect();

        let decision = if self.includes.is_empty() || !matched_include_rules.is_empty() {
            Decision::In
        } else {
            Decision::Out
        };

        Ok(ScopeExplanation {
            decision,
            matched_include_rules,
            matched_exclude_rules: Vec::new(),
        })
    }
}

fn extract_host(url: &str) -> Result<String, ScopeError> {
    let parsed = url::Url::parse(url).map_err(|_| ScopeError::MissingHost(url.to_string()))?;
    parsed
        .host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or_else(|| ScopeError::MissingHost(url.to_string()))
}

fn parse_rule(pattern: &str, polarity: ScopePolarity) -> Result<ScopeRule, ScopeError> {
    if pattern.is_empty() {
        return Err(ScopeError::EmptyPattern);
    }
    let lower = pattern.to_ascii_lowercase();

    if let Some(base) = lower.strip_prefix("**.") {
        if base.is_empty() {
            return Err(ScopeError::MissingBase(pattern.to_string()));
        }
        return Ok(ScopeRule {
            kind: ScopeRuleKind::DeepWildcard,
            pattern: base.to_string(),
            polarity,
        });
    }
    if let Some(base) = lower.strip_prefix("*.") {
        if base.is_empty() {
            return Err(ScopeError::MissingBase(pattern.to_string()));
        }
        return Ok(ScopeRule {
            kind: ScopeRuleKind::SingleWildcard,
            pattern: base.to_string(),
            polarity,
        });
    }
    Ok(ScopeRule {
        kind: ScopeRuleKind::Exact,
        pattern: lower,
        polarity,
    })
}

fn rule_matches(rule: &ScopeRule, host: &str) -> bool {
    match rule.kind {
        ScopeRuleKind::Exact => host == rule.pattern,
        ScopeRuleKind::SingleWildcard => matches_single_wildcard(host, &rule.pattern),
        ScopeRuleKind::DeepWildcard => matches_deep_wildcard(host, &rule.pattern),
    }
}

/// `*.base` matches host H iff H has the form `L.base` where L is exactly
/// one DNS label (no embedded dots). `L.M.base` does not match.
fn matches_single_wildcard(host: &str, base: &str) -> bool {
    let suffix = format!(".{base}");
    match host.strip_suffix(&suffix) {
        Some(prefix) => !prefix.is_empty() && !prefix.contains('.'),
        None => false,
    }
}

/// `**.base` matches `base` itself or any host ending in `.base`, at any
/// subdomain depth.
fn matches_deep_wildcard(host: &str, base: &str) -> bool {
    host == base || host.ends_with(&format!(".{base}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_wildcard_requires_exactly_one_label() {
        let mut engine = ScopeEngine::new();
        engine.add_include("*.example.com").unwrap();
        assert_eq!(
            engine.decide("https://a.example.com/").unwrap(),
            Decision::In
        );
        assert_eq!(
            engine.decide("https://x.y.example.com/").unwrap(),
            Decision::Out
        );
    }

    #[test]
    fn deep_wildcard_matches_any_depth_and_base() {
        let mut engine = ScopeEngine::new();
        engine.add_include("**.example.com").unwrap();
        assert_eq!(
            engine.decide("https://example.com/").unwrap(),
            Decision::In
        );
        assert_eq!(
            engine.decide("https://x.y.example.com/").unwrap(),
            Decision::In
        );
    }

    #[test]
    fn exclusion_priority_wins_over_include() {
        let mut engine = ScopeEngine::new();
        engine.add_include("*.example.com").unwrap();
        engine.add_exclude("admin.example.com").unwrap();
        assert_eq!(
            engine.decide("https://admin.example.com/").unwrap(),
            Decision::Out
        );
    }

    #[test]
    fn empty_includes_means_anything_not_excluded_is_in() {
        let mut engine = ScopeEngine::new();
        engine.add_exclude("bad.example.com").unwrap();
        assert_eq!(
            engine.decide("https://anything.else/").unwrap(),
            Decision::In
        );
        assert_eq!(
            engine.decide("https://bad.example.com/").unwrap(),
            Decision::Out
        );
    }

    #[test]
    fn rule_insertion_order_does_not_affect_decision() {
        let mut a = ScopeEngine::new();
        a.add_include("*.example.com").unwrap();
        a.add_exclude("admin.example.com").unwrap();

        let mut b = ScopeEngine::new();
        b.add_exclude("admin.example.com").unwrap();
        b.add_include("*.example.com").unwrap();

        for url in ["https://a.example.com/", "https://admin.example.com/"] {
            assert_eq!(a.decide(url).unwrap(), b.decide(url).unwrap());
        }
    }

    #[test]
    fn explain_reports_matched_rules() {
        let mut engine = ScopeEngine::new();
        engine.add_include("*.example.com").unwrap();
        let explanation = engine.explain("https://a.example.com/").unwrap();
        assert_eq!(explanation.decision, Decision::In);
        assert_eq!(explanation.matched_include_rules.len(), 1);
        assert!(explanation.matched_exclude_rules.is_empty());
    }

    #[test]
    fn from_rules_round_trips_through_rules() {
        let mut engine = ScopeEngine::new();
        engine.add_include("*.example.com").unwrap();
        engine.add_exclude("admin.example.com").unwrap();
        let rebuilt = ScopeEngine::from_rules(engine.rules());
        for url in ["https://a.example.com/", "https://admin.example.com/"] {
            assert_eq!(engine.decide(url).unwrap(), rebuilt.decide(url).unwrap());
        }
    }

    #[test]
    fn rejects_wildcard_with_no_base() {
        let mut engine = ScopeEngine::new();
        assert_eq!(
            engine.add_include("*."),
            Err(ScopeError::MissingBase("*.".to_string()))
        );
    }
}
