//! Merchant name normalization
//!
//! Collapses raw bank-statement descriptions into a short canonical merchant
//! key, so that "DEBIT CARD PURCHASE - NETFLIX.COM 01/15" and
//! "DEBIT CARD PURCHASE - NETFLIX.COM 02/15" land in the same group.
//!
//! The boilerplate-stripping step is data-driven: an ordered list of
//! [`NormalizeRule`]s, each a regex and its replacement, run once against the
//! uppercased description. The built-in list can be replaced from config.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::NormalizerConfig;
use crate::error::Result;

/// A single (pattern, replacement) rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl NormalizeRule {
    /// Rule that deletes whatever `pattern` matches
    pub fn strip(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: String::new(),
        }
    }
}

/// Built-in rules, in application order
///
/// Prefixes first (card-network and processor boilerplate), then trailing
/// dates, reference/check numbers, and account fragments.
pub fn builtin_rules() -> Vec<NormalizeRule> {
    [
        r"^\s*DEBIT CARD PURCHASE\s*-?\s*",
        r"^\s*POS (?:DEBIT|PURCHASE)\s*-?\s*",
        r"^\s*CHECK ?CARD\s+\d{4}\s*",
        r"^\s*PURCHASE AUTHORIZED ON\s+\d{1,2}/\d{1,2}(?:/\d{2,4})?\s*",
        r"^\s*ACH (?:DEBIT|WITHDRAWAL)\s*-?\s*",
        r"^\s*(?:RECURRING|PREAUTHORIZED|AUTOPAY)(?: (?:PAYMENT|DEBIT|PMT))?\s*-?\s*",
        r"^\s*(?:APLPAY|APPLEPAY|APPLE PAY|GPAY)\s+",
        r"^\s*(?:SQ|PAYPAL|TST|SP|PY)\s*\*\s*",
        r"\s+\d{1,2}/\d{1,2}(?:/\d{2,4})?\s*$",
        r"\s+(?:REF|REFERENCE|TRACE|CONF|TRN|ID)(?:\s*(?:#|NO\.?|:)\s*|\s+)[A-Z0-9-]*\d[A-Z0-9-]*\s*$",
        r"\s+(?:CHECK|CHK)\s*#?\s*\d+\s*$",
        r"\s+(?:ACCT|ACCOUNT|CARD)\s*(?:#|NO\.?|ENDING(?: IN)?)?\s*[X*]*\d{2,}\s*$",
        r"\s+[X*]{2,}\d{2,}\s*$",
        r"[\s#*]+\d{4,}\s*$",
    ]
    .into_iter()
    .map(NormalizeRule::strip)
    .collect()
}

struct CompiledRule {
    regex: Regex,
    replacement: String,
}

/// Compiled normalizer. Construction validates every rule; `normalize` is total.
pub struct MerchantNormalizer {
    rules: Vec<CompiledRule>,
    max_tokens: usize,
    fallback_key: String,
}

impl MerchantNormalizer {
    /// Compile a normalizer from config. Fails on the first invalid pattern.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    regex: Regex::new(&rule.pattern)?,
                    replacement: rule.replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            max_tokens: config.max_tokens.max(1),
            fallback_key: config.fallback_key.clone(),
        })
    }

    /// Number of compiled rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Canonical merchant key for a description.
    ///
    /// Never returns an empty string: when nothing survives, the configured
    /// fallback key (`"unknown_merchant"` by default) is returned.
    pub fn normalize(&self, description: &str) -> String {
        let mut text = description.to_uppercase();

        for rule in &self.rules {
            text = rule
                .regex
                .replace(&text, rule.replacement.as_str())
                .into_owned();
        }

        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .filter(|c| c.is_alphanumeric() || *c == ' ')
            .collect();

        let key = cleaned
            .split_whitespace()
            .take(self.max_tokens)
            .collect::<Vec<_>>()
            .join(" ");

        if key.is_empty() {
            self.fallback_key.clone()
        } else {
            key
        }
    }
}

impl Default for MerchantNormalizer {
    fn default() -> Self {
        let config = NormalizerConfig::default();
        Self::new(&config).unwrap_or_else(|e| {
            warn!(error = %e, "Built-in normalizer rules failed to compile, using none");
            Self {
                rules: Vec::new(),
                max_tokens: config.max_tokens,
                fallback_key: config.fallback_key,
            }
        })
    }
}

impl std::fmt::Debug for MerchantNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantNormalizer")
            .field("rules", &self.rules.len())
            .field("max_tokens", &self.max_tokens)
            .field("fallback_key", &self.fallback_key)
            .finish()
    }
}

/// Normalize with the built-in rules
pub fn normalize(description: &str) -> String {
    MerchantNormalizer::default().normalize(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_compile() {
        let normalizer = MerchantNormalizer::new(&NormalizerConfig::default()).unwrap();
        assert_eq!(normalizer.rule_count(), builtin_rules().len());
    }

    #[test]
    fn test_trailing_dates_collapse() {
        let jan = normalize("DEBIT CARD PURCHASE - NETFLIX.COM 01/15");
        let feb = normalize("DEBIT CARD PURCHASE - NETFLIX.COM 02/15");
        assert_eq!(jan, feb);
        assert_eq!(jan, "netflixcom");
    }

    #[test]
    fn test_processor_prefixes() {
        assert_eq!(normalize("SQ *BLUE BOTTLE COFFEE"), "blue bottle coffee");
        assert_eq!(normalize("PAYPAL *SPOTIFY"), "spotify");
        assert_eq!(normalize("POS DEBIT - SAFEWAY #1234"), "safeway");
        assert_eq!(normalize("TST* PIZZA PLACE"), "pizza place");
        assert_eq!(normalize("APLPAY STARBUCKS SEATTLE"), "starbucks seattle");
    }

    #[test]
    fn test_authorization_boilerplate() {
        assert_eq!(
            normalize("PURCHASE AUTHORIZED ON 03/02 CHEVRON 0091"),
            normalize("PURCHASE AUTHORIZED ON 04/02 CHEVRON 0091"),
        );
        assert_eq!(
            normalize("PURCHASE AUTHORIZED ON 03/02 CHEVRON 0091"),
            "chevron"
        );
    }

    #[test]
    fn test_reference_and_account_fragments() {
        assert_eq!(normalize("CITY WATER UTIL REF 88ABC12"), "city water util");
        assert_eq!(normalize("LANDLORD LLC CHECK #1042"), "landlord llc");
        assert_eq!(normalize("ALLSTATE INS ACCT XXXX1234"), "allstate ins");
        assert_eq!(normalize("NETFLIX.COM*12345"), "netflixcom");
    }

    #[test]
    fn test_keeps_first_three_tokens() {
        assert_eq!(
            normalize("PLANET FITNESS CLUB MONTHLY DUES"),
            "planet fitness club"
        );
    }

    #[test]
    fn test_empty_and_noise_inputs_return_sentinel() {
        assert_eq!(normalize(""), "unknown_merchant");
        assert_eq!(normalize("   "), "unknown_merchant");
        assert_eq!(normalize("*** --- ###"), "unknown_merchant");
        assert_eq!(normalize("DEBIT CARD PURCHASE - "), "unknown_merchant");
    }

    #[test]
    fn test_unicode_is_total() {
        assert_eq!(normalize("CAFÉ ÉCLAIR"), "café éclair");
        assert!(!normalize("😀🔥").is_empty());
    }

    #[test]
    fn test_custom_rules_are_data_driven() {
        let config = NormalizerConfig {
            rules: vec![NormalizeRule {
                pattern: r"^AMZN MKTP US\*?\s*".to_string(),
                replacement: "AMAZON ".to_string(),
            }],
            max_tokens: 2,
            fallback_key: "unknown".to_string(),
        };
        let normalizer = MerchantNormalizer::new(&config).unwrap();
        assert_eq!(normalizer.normalize("AMZN MKTP US*2K4 ORDER"), "amazon 2k4");
        assert_eq!(normalizer.normalize(""), "unknown");
    }

    #[test]
    fn test_invalid_rule_is_an_error() {
        let config = NormalizerConfig {
            rules: vec![NormalizeRule::strip("(unclosed")],
            ..NormalizerConfig::default()
        };
        assert!(MerchantNormalizer::new(&config).is_err());
    }
}
