use std::collections::BTreeMap;

use crate::{ModelBreakdown, MonthlyStats, MonthlyUsageSample};

/// Roll a flat sample list up into per-month stats with models ranked by
/// spend. Returns `None` for an empty input so callers can distinguish
/// "no data" from a zero-valued month.
///
/// Grouping is a commutative fold: any permutation of `samples` produces
/// identical totals per (month, model).
pub fn aggregate(samples: &[MonthlyUsageSample]) -> Option<Vec<MonthlyStats>> {
    if samples.is_empty() {
        return None;
    }

    let mut months: BTreeMap<String, BTreeMap<String, ModelBreakdown>> = BTreeMap::new();
    for sample in samples {
        let breakdown = months
            .entry(sample.month.clone())
            .or_default()
            .entry(sample.model.clone())
            .or_insert_with(|| ModelBreakdown {
                model: sample.model.clone(),
                input_tokens: 0,
                output_tokens: 0,
                cache_creation_tokens: 0,
                cache_read_tokens: 0,
                total_cost_usd: 0.0,
            });
        breakdown.input_tokens = breakdown.input_tokens.saturating_add(sample.input_tokens);
        breakdown.output_tokens = breakdown.output_tokens.saturating_add(sample.output_tokens);
        breakdown.cache_creation_tokens = breakdown
            .cache_creation_tokens
            .saturating_add(sample.cache_creation_tokens);
        breakdown.cache_read_tokens = breakdown
            .cache_read_tokens
            .saturating_add(sample.cache_read_tokens);
        breakdown.total_cost_usd += sample.cost_usd;
    }

    let mut stats: Vec<MonthlyStats> = months
        .into_iter()
        .map(|(month, models)| {
            let mut models: Vec<ModelBreakdown> = models.into_values().collect();
            models.sort_by(|a, b| {
                b.total_cost_usd
                    .partial_cmp(&a.total_cost_usd)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut month_stats = MonthlyStats {
                month,
                input_tokens: 0,
                output_tokens: 0,
                cache_creation_tokens: 0,
                cache_read_tokens: 0,
                total_cost_usd: 0.0,
                models,
            };
            for model in &month_stats.models {
                month_stats.input_tokens =
                    month_stats.input_tokens.saturating_add(model.input_tokens);
                month_stats.output_tokens = month_stats
                    .output_tokens
                    .saturating_add(model.output_tokens);
                month_stats.cache_creation_tokens = month_stats
                    .cache_creation_tokens
                    .saturating_add(model.cache_creation_tokens);
                month_stats.cache_read_tokens = month_stats
                    .cache_read_tokens
                    .saturating_add(model.cache_read_tokens);
                month_stats.total_cost_usd += model.total_cost_usd;
            }
            month_stats
        })
        .collect();

    // Most recent month first.
    stats.sort_by(|a, b| b.month.cmp(&a.month));
    Some(stats)
}
