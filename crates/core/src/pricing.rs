use crate::Provider;

/// Per-1M-token rates for one model family. `pattern` is matched as a
/// case-insensitive substring because logged model names carry version
/// suffixes and date stamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCard {
    pub pattern: &'static str,
    pub input_per_1m: f64,
    pub output_per_1m: f64,
    pub cache_creation_multiplier: f64,
    pub cache_read_multiplier: f64,
}

// Order matters: a model name like "gpt-5-mini-2025" contains both
// "gpt-5-mini" and "gpt-5", so the narrower pattern must come first.
const CODEX_RATE_CARDS: &[RateCard] = &[
    RateCard {
        pattern: "gpt-5-mini",
        input_per_1m: 0.60,
        output_per_1m: 2.00,
        cache_creation_multiplier: 0.0,
        cache_read_multiplier: 0.1,
    },
    RateCard {
        pattern: "gpt-5-nano",
        input_per_1m: 0.20,
        output_per_1m: 0.80,
        cache_creation_multiplier: 0.0,
        cache_read_multiplier: 0.1,
    },
    RateCard {
        pattern: "gpt-5",
        input_per_1m: 1.25,
        output_per_1m: 10.00,
        cache_creation_multiplier: 0.0,
        cache_read_multiplier: 0.1,
    },
];

const CLAUDE_RATE_CARDS: &[RateCard] = &[
    RateCard {
        pattern: "opus",
        input_per_1m: 15.00,
        output_per_1m: 75.00,
        cache_creation_multiplier: 1.25,
        cache_read_multiplier: 0.1,
    },
    RateCard {
        pattern: "sonnet",
        input_per_1m: 3.00,
        output_per_1m: 15.00,
        cache_creation_multiplier: 1.25,
        cache_read_multiplier: 0.1,
    },
    RateCard {
        pattern: "haiku",
        input_per_1m: 0.25,
        output_per_1m: 1.25,
        cache_creation_multiplier: 1.25,
        cache_read_multiplier: 0.1,
    },
];

/// Look up the rate card for a logged model name. Unknown models return
/// `None`; they price to zero rather than erroring because many models
/// are deliberately unpriced.
pub fn rate_card(provider: Provider, model: &str) -> Option<&'static RateCard> {
    let cards = match provider {
        Provider::Claude => CLAUDE_RATE_CARDS,
        Provider::Codex => CODEX_RATE_CARDS,
    };
    let model = model.to_ascii_lowercase();
    cards.iter().find(|card| model.contains(card.pattern))
}

/// Cost in USD for the given token counts under `card`. `None` means an
/// unpriced model and costs exactly 0.0.
///
/// Callers for providers that report cache-read tokens as a subset of the
/// input field must subtract cache-read from input (clamped at zero)
/// before calling, or the same tokens are billed at both rates.
pub fn calculate_cost(
    card: Option<&RateCard>,
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_tokens: u64,
    cache_read_tokens: u64,
) -> f64 {
    let Some(card) = card else {
        return 0.0;
    };
    let input_cost = (input_tokens as f64 / 1_000_000.0) * card.input_per_1m;
    let output_cost = (output_tokens as f64 / 1_000_000.0) * card.output_per_1m;
    let cache_creation_cost = (cache_creation_tokens as f64 / 1_000_000.0)
        * card.input_per_1m
        * card.cache_creation_multiplier;
    let cache_read_cost =
        (cache_read_tokens as f64 / 1_000_000.0) * card.input_per_1m * card.cache_read_multiplier;
    input_cost + output_cost + cache_creation_cost + cache_read_cost
}
