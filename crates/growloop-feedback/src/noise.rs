//! Pre-model noise rejection and quality weighting.

use growloop_core::{NoiseConfig, NoiseWeights};
use regex::Regex;

use crate::types::{Classification, Intensity, NoiseReason};

/// Cheap noise detection run before any model call.
#[derive(Debug)]
pub struct NoiseFilter {
    min_content_length: usize,
    vague_patterns: Vec<Regex>,
}

impl NoiseFilter {
    /// Compile the configured vague-response patterns.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when a configured pattern is
    /// not a valid regular expression.
    pub fn new(config: &NoiseConfig) -> Result<Self, regex::Error> {
        let vague_patterns = config
            .vague_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            min_content_length: config.min_content_length,
            vague_patterns,
        })
    }

    /// Checks run in order: length first, then the vague-response patterns.
    #[must_use]
    pub fn prefilter(&self, content: &str) -> Option<NoiseReason> {
        if content.chars().count() < self.min_content_length {
            return Some(NoiseReason::TooShort);
        }
        let trimmed = content.trim();
        if self.vague_patterns.iter().any(|p| p.is_match(trimmed)) {
            return Some(NoiseReason::VagueResponse);
        }
        None
    }
}

/// Derive the item weight from its classification signals.
///
/// Starts at 1.0 and compounds multiplicatively, uncapped.
pub fn apply_weight(classification: &mut Classification, weights: &NoiseWeights) {
    let mut weight = 1.0;

    if classification.noise_score > 0.5 {
        weight *= weights.vague_or_short;
    }
    if classification.is_specific && classification.is_actionable {
        weight *= weights.specific_and_actionable;
    }
    if classification.intensity == Some(Intensity::High) {
        weight *= weights.high_intensity;
    }

    classification.weight = weight;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> NoiseFilter {
        NoiseFilter::new(&NoiseConfig::default()).unwrap()
    }

    #[test]
    fn two_char_reply_is_too_short() {
        assert_eq!(filter().prefilter("ok"), Some(NoiseReason::TooShort));
    }

    #[test]
    fn length_check_runs_before_vague_patterns() {
        // "i guess" matches a vague pattern but fails the length check first.
        assert_eq!(filter().prefilter("i guess"), Some(NoiseReason::TooShort));
    }

    #[test]
    fn padded_vague_reply_is_vague_response() {
        assert_eq!(
            filter().prefilter("its okay.    "),
            Some(NoiseReason::VagueResponse)
        );
    }

    #[test]
    fn substantive_reply_passes() {
        assert_eq!(
            filter().prefilter("the search keeps missing older posts entirely"),
            None
        );
    }

    #[test]
    fn vague_match_is_case_insensitive() {
        assert_eq!(
            filter().prefilter("Its Okay.     "),
            Some(NoiseReason::VagueResponse)
        );
    }

    #[test]
    fn weight_defaults_to_one() {
        let mut c = Classification::default();
        apply_weight(&mut c, &NoiseWeights::default());
        assert!((c.weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn noisy_classification_is_discounted() {
        let mut c = Classification {
            noise_score: 0.8,
            ..Classification::default()
        };
        apply_weight(&mut c, &NoiseWeights::default());
        assert!((c.weight - 0.5).abs() < 1e-9);
    }

    #[test]
    fn quality_signals_compound_multiplicatively() {
        let mut c = Classification {
            is_specific: true,
            is_actionable: true,
            intensity: Some(Intensity::High),
            ..Classification::default()
        };
        apply_weight(&mut c, &NoiseWeights::default());
        assert!((c.weight - 1.2 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn specific_but_not_actionable_earns_no_bonus() {
        let mut c = Classification {
            is_specific: true,
            ..Classification::default()
        };
        apply_weight(&mut c, &NoiseWeights::default());
        assert!((c.weight - 1.0).abs() < f64::EPSILON);
    }
}
