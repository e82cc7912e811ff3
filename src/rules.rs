use serde::Serialize;

/// Path the rewrite was written against. Used when neither `FILE` nor
/// `EXTRACTPATCH_FILE` is given.
pub const DEFAULT_TARGET: &str = "/home/ubuntu/bayarea-dashboard/api/market.ts";

/// One ordered search-and-replace pass.
///
/// `replacement` follows `regex` expansion syntax, so captured groups are
/// referenced as `${1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
    pub dot_matches_newline: bool,
}

const SIGNATURE: RewriteRule = RewriteRule {
    name: "signature",
    pattern: r"function extractGoldPrice\(text: string\): number \| null \{",
    replacement: "function extractGoldPrice(text: string): { price: number | null; method: string } {",
    dot_matches_newline: false,
};

const GOLD_DOLLAR_PATTERN: RewriteRule = RewriteRule {
    name: "gold_dollar_pattern",
    pattern: r"(// Pattern 1: Look for 4-digit price in gold range with \$ symbol.*?if \(price >= 2000 && price <= 5000\) \{\s+)return price;",
    replacement: "${1}return { price, method: 'gold_dollar_pattern' };",
    dot_matches_newline: true,
};

const GOLD_FOUR_DIGIT_PATTERN: RewriteRule = RewriteRule {
    name: "gold_four_digit_pattern",
    pattern: r"(// Pattern 2: Look for 4-digit number in gold range.*?if \(price >= 2000 && price <= 5000\) \{\s+)return price;",
    replacement: "${1}return { price, method: 'gold_four_digit_pattern' };",
    dot_matches_newline: true,
};

const GOLD_KEYWORD_AFTER: RewriteRule = RewriteRule {
    name: "gold_keyword_after",
    pattern: r#"(// Pattern 3: Look for "gold" followed by 4-digit price.*?if \(price >= 2000 && price <= 5000\) \{\s+)return price;"#,
    replacement: "${1}return { price, method: 'gold_keyword_after' };",
    dot_matches_newline: true,
};

const GOLD_KEYWORD_BEFORE: RewriteRule = RewriteRule {
    name: "gold_keyword_before",
    pattern: r#"(// Pattern 4: Look for price before "gold".*?if \(price >= 2000 && price <= 5000\) \{\s+)return price;"#,
    replacement: "${1}return { price, method: 'gold_keyword_before' };",
    dot_matches_newline: true,
};

// Must stay last: it anchors on the function name, which rule 1 keeps intact.
const NO_PATTERN_MATCHED: RewriteRule = RewriteRule {
    name: "no_pattern_matched",
    pattern: r"(function extractGoldPrice.*?)\s+return null;\n\}",
    replacement: "${1}\n  return { price: null, method: 'no_pattern_matched' };\n}",
    dot_matches_newline: true,
};

const GOLD_PRICE_RULES: [RewriteRule; 6] = [
    SIGNATURE,
    GOLD_DOLLAR_PATTERN,
    GOLD_FOUR_DIGIT_PATTERN,
    GOLD_KEYWORD_AFTER,
    GOLD_KEYWORD_BEFORE,
    NO_PATTERN_MATCHED,
];

/// Rules that turn `extractGoldPrice` into a `{ price, method }` returner,
/// in application order.
pub fn gold_price_rules() -> &'static [RewriteRule] {
    &GOLD_PRICE_RULES
}
