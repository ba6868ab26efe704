//! Sequential feedback classification through the model.

use std::collections::BTreeMap;

use growloop_core::NoiseWeights;
use growloop_llm::{parse_json_response, LlmClient, Pacer};
use tracing::{debug, info, warn};

use crate::noise::{apply_weight, NoiseFilter};
use crate::types::{ClassifiedItem, Classification, FeedbackItem};

/// Prompt template for single-item classification.
pub const CLASSIFY_PROMPT: &str = include_str!("../prompts/classify-feedback.md");

/// Outcome counts for one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifySummary {
    pub classified: usize,
    pub skipped: usize,
    pub errored: usize,
    pub by_category: BTreeMap<String, usize>,
}

fn build_prompt(template: &str, item: &FeedbackItem) -> String {
    template
        .replace("{{source}}", &item.source)
        .replace("{{user_id}}", &item.user_id)
        .replace("{{user_type}}", item.user_type.as_deref().unwrap_or("unknown"))
        .replace("{{context}}", item.context.as_deref().unwrap_or("No context"))
        .replace("{{content}}", &item.content)
}

/// Classify every item, one model call at a time with the configured
/// inter-call delay.
///
/// Prefiltered noise never reaches the model; a failed call or unparseable
/// response annotates that item with an error and the loop continues. Partial
/// success is the normal case, so this never fails as a whole.
pub async fn classify_all(
    client: &LlmClient,
    items: Vec<FeedbackItem>,
    filter: &NoiseFilter,
    weights: &NoiseWeights,
    rate_limit_ms: u64,
) -> (Vec<ClassifiedItem>, ClassifySummary) {
    let mut pacer = Pacer::new(rate_limit_ms);
    let mut results = Vec::with_capacity(items.len());
    let mut summary = ClassifySummary::default();
    let total = items.len();

    info!(total, "classifying feedback items");

    for (index, item) in items.into_iter().enumerate() {
        if let Some(reason) = filter.prefilter(&item.content) {
            debug!(id = %item.id, %reason, "prefiltered as noise");
            summary.skipped += 1;
            results.push(ClassifiedItem {
                item,
                classification: Classification {
                    category: "noise".to_owned(),
                    noise_score: 1.0,
                    skipped: true,
                    skip_reason: Some(reason),
                    ..Classification::default()
                },
            });
            continue;
        }

        pacer.pause().await;
        debug!(id = %item.id, position = index + 1, total, "classifying");

        let classification = match classify_item(client, &item).await {
            Ok(mut classification) => {
                apply_weight(&mut classification, weights);
                summary.classified += 1;
                classification
            }
            Err(message) => {
                warn!(id = %item.id, error = %message, "classification failed");
                summary.errored += 1;
                Classification {
                    error: Some(message),
                    ..Classification::default()
                }
            }
        };
        results.push(ClassifiedItem {
            item,
            classification,
        });
    }

    for result in &results {
        let category = result.classification.category.as_str();
        let key = if category.is_empty() { "unknown" } else { category };
        *summary.by_category.entry(key.to_owned()).or_insert(0) += 1;
    }

    info!(
        classified = summary.classified,
        skipped = summary.skipped,
        errored = summary.errored,
        "classification pass complete"
    );

    (results, summary)
}

async fn classify_item(client: &LlmClient, item: &FeedbackItem) -> Result<Classification, String> {
    let prompt = build_prompt(CLASSIFY_PROMPT, item);
    let text = client.complete(&prompt).await.map_err(|e| e.to_string())?;
    parse_json_response(&text).map_err(|e| e.to_string())
}
