//! Insight synthesis: model-driven clustering with a deterministic fallback.

use std::collections::BTreeMap;

use async_trait::async_trait;
use growloop_core::NoiseWeights;
use growloop_llm::{parse_json_response, LlmClient};
use serde::Serialize;
use tracing::{info, warn};

use crate::types::{Action, ClassifiedItem, Insight, Intensity, SynthesisOutcome};

/// Prompt template for batch insight extraction.
pub const INSIGHTS_PROMPT: &str = include_str!("../prompts/extract-insights.md");

const MAX_SAMPLE_QUOTES: usize = 3;

/// Turns classified feedback into aggregated insights.
#[async_trait]
pub trait Clusterer {
    async fn synthesize(&self, items: &[ClassifiedItem]) -> SynthesisOutcome;
}

fn valid_items(items: &[ClassifiedItem]) -> Vec<&ClassifiedItem> {
    items.iter().filter(|i| i.classification.is_valid()).collect()
}

/// Deterministic clusterer: groups by product area, then category.
///
/// Used directly when no model is available and as the fallback when the
/// model call fails or returns something unparseable.
#[derive(Debug, Default)]
pub struct FallbackClusterer;

#[async_trait]
impl Clusterer for FallbackClusterer {
    async fn synthesize(&self, items: &[ClassifiedItem]) -> SynthesisOutcome {
        let valid = valid_items(items);
        if valid.is_empty() {
            return SynthesisOutcome::default();
        }

        let mut by_area: BTreeMap<String, Vec<&ClassifiedItem>> = BTreeMap::new();
        for item in &valid {
            let area = item
                .classification
                .product_area
                .clone()
                .unwrap_or_else(|| "general".to_owned());
            by_area.entry(area).or_default().push(item);
        }

        let mut insights = Vec::new();
        for (area, area_items) in &by_area {
            let mut by_category: BTreeMap<String, Vec<&ClassifiedItem>> = BTreeMap::new();
            for item in area_items {
                let category = if item.classification.category.is_empty() {
                    "unknown".to_owned()
                } else {
                    item.classification.category.clone()
                };
                by_category.entry(category).or_default().push(item);
            }

            for (category, cluster) in &by_category {
                insights.push(Insight {
                    theme: format!("{category} feedback in {area}"),
                    category: category.clone(),
                    product_area: area.clone(),
                    evidence_count: cluster.len(),
                    intensity: predominant_intensity(cluster),
                    sample_quotes: sample_quotes(cluster),
                    user_ids: distinct_user_ids(cluster),
                    product_implication: Some("Manual review needed".to_owned()),
                    action: Action::Monitor,
                    confidence: 0.5,
                    weight_bonus: None,
                });
            }
        }

        let mut category_summary = BTreeMap::new();
        for item in &valid {
            let category = if item.classification.category.is_empty() {
                "unknown"
            } else {
                item.classification.category.as_str()
            };
            *category_summary.entry(category.to_owned()).or_insert(0) += 1;
        }

        SynthesisOutcome {
            insights,
            patterns_detected: Vec::new(),
            category_summary,
            top_priorities: Vec::new(),
        }
    }
}

/// Mode of the observed intensities. First-seen wins ties; medium when no
/// item carries one.
fn predominant_intensity(cluster: &[&ClassifiedItem]) -> Intensity {
    let mut counts: Vec<(Intensity, usize)> = Vec::new();
    for item in cluster {
        let Some(intensity) = item.classification.intensity else {
            continue;
        };
        match counts.iter_mut().find(|(i, _)| *i == intensity) {
            Some((_, n)) => *n += 1,
            None => counts.push((intensity, 1)),
        }
    }

    let mut best: Option<(Intensity, usize)> = None;
    for (intensity, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((intensity, count));
        }
    }
    best.map_or(Intensity::Medium, |(intensity, _)| intensity)
}

fn sample_quotes(cluster: &[&ClassifiedItem]) -> Vec<String> {
    cluster
        .iter()
        .filter_map(|i| i.classification.key_quote.clone())
        .take(MAX_SAMPLE_QUOTES)
        .collect()
}

fn distinct_user_ids(cluster: &[&ClassifiedItem]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for item in cluster {
        if !ids.contains(&item.item.user_id) {
            ids.push(item.item.user_id.clone());
        }
    }
    ids
}

/// Condensed item view serialized into the insights prompt.
#[derive(Serialize)]
struct CondensedItem<'a> {
    id: &'a str,
    user_id: &'a str,
    content: &'a str,
    category: &'a str,
    subcategory: Option<&'a str>,
    product_area: Option<&'a str>,
    intensity: Option<Intensity>,
    extracted_insight: Option<&'a str>,
    key_quote: Option<&'a str>,
    pattern_type: Option<&'a str>,
    weight: f64,
}

impl<'a> From<&'a ClassifiedItem> for CondensedItem<'a> {
    fn from(item: &'a ClassifiedItem) -> Self {
        let c = &item.classification;
        Self {
            id: &item.item.id,
            user_id: &item.item.user_id,
            content: &item.item.content,
            category: &c.category,
            subcategory: c.subcategory.as_deref(),
            product_area: c.product_area.as_deref(),
            intensity: c.intensity,
            extracted_insight: c.extracted_insight.as_deref(),
            key_quote: c.key_quote.as_deref(),
            pattern_type: c.pattern_type.as_deref(),
            weight: c.weight,
        }
    }
}

/// Model-backed clusterer with deterministic fallback.
pub struct LlmClusterer {
    client: LlmClient,
    weights: NoiseWeights,
}

impl LlmClusterer {
    #[must_use]
    pub fn new(client: LlmClient, weights: NoiseWeights) -> Self {
        Self { client, weights }
    }

    async fn synthesize_with_model(
        &self,
        valid: &[&ClassifiedItem],
    ) -> Result<SynthesisOutcome, String> {
        let condensed: Vec<CondensedItem<'_>> =
            valid.iter().map(|item| CondensedItem::from(*item)).collect();
        let serialized =
            serde_json::to_string_pretty(&condensed).map_err(|e| e.to_string())?;
        let prompt = INSIGHTS_PROMPT.replace("{{feedback_items}}", &serialized);

        let text = self.client.complete(&prompt).await.map_err(|e| e.to_string())?;
        parse_json_response(&text).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Clusterer for LlmClusterer {
    async fn synthesize(&self, items: &[ClassifiedItem]) -> SynthesisOutcome {
        let valid = valid_items(items);
        if valid.is_empty() {
            info!("no valid feedback to cluster");
            return SynthesisOutcome::default();
        }

        info!(count = valid.len(), "clustering feedback items");

        match self.synthesize_with_model(&valid).await {
            Ok(mut outcome) => {
                for insight in &mut outcome.insights {
                    if insight.evidence_count > 1 {
                        insight.weight_bonus = Some(self.weights.multiple_occurrences);
                    }
                }
                info!(insights = outcome.insights.len(), "model synthesis complete");
                outcome
            }
            Err(error) => {
                warn!(%error, "model synthesis failed, using fallback clustering");
                FallbackClusterer.synthesize(items).await
            }
        }
    }
}
