use serde::Serialize;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Sentiment scores for a piece of text. `compound` is the normalized
/// overall polarity in [-1, 1]; `pos`/`neu`/`neg` are the component ratios.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sentiment {
    pub compound: f64,
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
}

/// Stateless sentiment scoring service backed by the VADER lexicon model.
/// The model internals are a black box; handlers only see [`Sentiment`].
pub struct SentimentService {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentService {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Score a review body
    pub fn analyze(&self, text: &str) -> Sentiment {
        let scores = self.analyzer.polarity_scores(text);
        Sentiment {
            compound: scores.get("compound").copied().unwrap_or(0.0),
            pos: scores.get("pos").copied().unwrap_or(0.0),
            neu: scores.get("neu").copied().unwrap_or(0.0),
            neg: scores.get("neg").copied().unwrap_or(0.0),
        }
    }
}

impl Default for SentimentService {
    fn default() -> Self {
        Self::new()
    }
}
