use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::ExtractPatchError;
use crate::rules::RewriteRule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub rule: &'static str,
    pub matches: usize,
}

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub text: String,
    pub steps: Vec<StepReport>,
    changed: bool,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn unmatched(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|step| step.matches == 0)
            .map(|step| step.rule)
            .collect()
    }
}

/// A rule with its pattern compiled.
#[derive(Debug)]
pub struct CompiledRule {
    rule: RewriteRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn compile(rule: RewriteRule) -> Result<Self, ExtractPatchError> {
        let regex = RegexBuilder::new(rule.pattern)
            .dot_matches_new_line(rule.dot_matches_newline)
            .build()
            .map_err(|error| ExtractPatchError::InvalidRequest {
                message: format!("Invalid pattern for rewrite rule '{}': {error}", rule.name),
            })?;
        Ok(Self { rule, regex })
    }

    pub fn name(&self) -> &'static str {
        self.rule.name
    }

    /// Replace every match in `text`, returning the new text and the number
    /// of matches. Zero matches hands back `text` untouched.
    pub fn apply(&self, text: String) -> (String, usize) {
        let matches = self.regex.find_iter(&text).count();
        if matches == 0 {
            return (text, 0);
        }
        let rewritten = self
            .regex
            .replace_all(&text, self.rule.replacement)
            .into_owned();
        (rewritten, matches)
    }
}

pub fn compile_rules(rules: &[RewriteRule]) -> Result<Vec<CompiledRule>, ExtractPatchError> {
    rules.iter().copied().map(CompiledRule::compile).collect()
}

/// Run `rules` in order, each over the previous pass's output.
///
/// Rules are written against `\n`. CRLF input is normalized before the first
/// pass and converted back after the last one.
pub fn rewrite_text(source: &str, rules: &[CompiledRule]) -> RewriteOutcome {
    let crlf = source.contains("\r\n");
    let mut text = if crlf {
        source.replace("\r\n", "\n")
    } else {
        source.to_string()
    };
    let mut steps = Vec::with_capacity(rules.len());

    for rule in rules {
        let (next, matches) = rule.apply(text);
        text = next;
        if matches == 0 {
            tracing::warn!(rule = rule.name(), "rewrite rule matched nothing");
        } else {
            tracing::debug!(rule = rule.name(), matches, "rewrite rule applied");
        }
        steps.push(StepReport {
            rule: rule.name(),
            matches,
        });
    }

    if crlf {
        text = text.replace('\n', "\r\n");
    }
    let changed = text != source;
    RewriteOutcome {
        text,
        steps,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{CompiledRule, compile_rules, rewrite_text};
    use crate::rules::{RewriteRule, gold_price_rules};

    const EXTRACTOR: &str = r#"function extractGoldPrice(text: string): number | null {
  // Pattern 1: Look for 4-digit price in gold range with $ symbol
  const dollarMatch = text.match(/\$\s*([2-5],?\d{3})/);
  if (dollarMatch) {
    const price = parseFloat(dollarMatch[1].replace(',', ''));
    if (price >= 2000 && price <= 5000) {
      return price;
    }
  }

  // Pattern 2: Look for 4-digit number in gold range
  const fourDigit = text.match(/\b([2-5]\d{3})\b/);
  if (fourDigit) {
    const price = parseFloat(fourDigit[1]);
    if (price >= 2000 && price <= 5000) {
      return price;
    }
  }

  // Pattern 3: Look for "gold" followed by 4-digit price
  const after = text.match(/gold[^\d]{0,40}([2-5],?\d{3})/i);
  if (after) {
    const price = parseFloat(after[1].replace(',', ''));
    if (price >= 2000 && price <= 5000) {
      return price;
    }
  }

  // Pattern 4: Look for price before "gold"
  const before = text.match(/([2-5],?\d{3})[^\d]{0,40}gold/i);
  if (before) {
    const price = parseFloat(before[1].replace(',', ''));
    if (price >= 2000 && price <= 5000) {
      return price;
    }
  }

  return null;
}
"#;

    fn gold_rules() -> Vec<CompiledRule> {
        compile_rules(gold_price_rules()).expect("built-in rules should compile")
    }

    #[test]
    fn full_extractor_gets_every_return_tagged() {
        let outcome = rewrite_text(EXTRACTOR, &gold_rules());

        assert!(outcome.changed());
        assert!(outcome.unmatched().is_empty(), "{:?}", outcome.steps);
        for step in &outcome.steps {
            assert_eq!(step.matches, 1, "rule '{}' should match once", step.rule);
        }
        for snippet in [
            "function extractGoldPrice(text: string): { price: number | null; method: string } {",
            "return { price, method: 'gold_dollar_pattern' };",
            "return { price, method: 'gold_four_digit_pattern' };",
            "return { price, method: 'gold_keyword_after' };",
            "return { price, method: 'gold_keyword_before' };",
            "  }\n  return { price: null, method: 'no_pattern_matched' };\n}\n",
        ] {
            assert!(
                outcome.text.contains(snippet),
                "missing snippet {snippet:?} in:\n{}",
                outcome.text
            );
        }
        assert!(!outcome.text.contains("return price;"));
        assert!(!outcome.text.contains("return null;"));
    }

    #[test]
    fn second_pass_over_own_output_matches_nothing() {
        let rules = gold_rules();
        let first = rewrite_text(EXTRACTOR, &rules);
        let second = rewrite_text(&first.text, &rules);

        assert!(!second.changed());
        assert_eq!(second.text, first.text);
        assert_eq!(second.unmatched().len(), rules.len());
    }

    #[test]
    fn missing_block_only_skips_its_own_rule() {
        let without_pattern_three = EXTRACTOR.replace(
            "// Pattern 3: Look for \"gold\" followed by 4-digit price",
            "// Pattern 3: keyword lookahead",
        );
        let outcome = rewrite_text(&without_pattern_three, &gold_rules());

        assert_eq!(outcome.unmatched(), vec!["gold_keyword_after"]);
        assert!(!outcome.text.contains("gold_keyword_after"));
        assert_eq!(outcome.text.matches("return price;").count(), 1);
        assert!(outcome.text.contains("method: 'gold_keyword_before'"));
    }

    #[test]
    fn crlf_extractor_is_fully_rewritten_and_keeps_crlf() {
        let source = EXTRACTOR.replace('\n', "\r\n");
        let outcome = rewrite_text(&source, &gold_rules());

        assert!(outcome.unmatched().is_empty(), "{:?}", outcome.steps);
        assert!(outcome.text.contains(
            "  }\r\n  return { price: null, method: 'no_pattern_matched' };\r\n}\r\n"
        ));
        assert!(!outcome.text.contains("return null;"));
        assert_eq!(
            outcome.text.matches('\n').count(),
            outcome.text.matches("\r\n").count(),
            "every newline should stay CRLF"
        );

        let lf_outcome = rewrite_text(EXTRACTOR, &gold_rules());
        assert_eq!(outcome.text, lf_outcome.text.replace('\n', "\r\n"));
    }

    #[test]
    fn pattern_rules_do_not_fire_outside_the_price_guard() {
        let source = "// Pattern 1: Look for 4-digit price in gold range with $ symbol\nreturn price;\n";
        let outcome = rewrite_text(source, &gold_rules());
        assert!(!outcome.changed());
        assert_eq!(outcome.text, source);
    }

    #[test]
    fn invalid_pattern_is_reported_with_rule_name() {
        let error = CompiledRule::compile(RewriteRule {
            name: "broken",
            pattern: "(unclosed",
            replacement: "",
            dot_matches_newline: false,
        })
        .expect_err("unbalanced group should fail to compile");
        assert!(error.to_string().contains("'broken'"));
    }

    proptest! {
        #[test]
        fn text_without_anchors_is_left_untouched(source in "[a-zA-Z0-9 ;{}()\n]{0,200}") {
            prop_assume!(!source.contains("extractGoldPrice"));
            let outcome = rewrite_text(&source, &gold_rules());
            prop_assert!(!outcome.changed());
            prop_assert_eq!(outcome.text, source);
        }
    }
}
