//! Turns retrieved chunks and a question into a grounded answer.

use crate::config::{AnswerConfig, RetrievalConfig};
use crate::error::{LecternError, Result};
use crate::index::retriever::{Retriever, SearchHit};
use crate::store::RecordingId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Fixed answer returned when retrieval grounds nothing.
const NOT_FOUND_ANSWER: &str = "I couldn't find relevant information in the recording for your \
question. Could you try rephrasing or asking about a different topic?";

/// Number of chunks retrieved when summarizing a whole recording.
const SUMMARY_TOP_K: usize = 10;

/// Query used to pull a cross-section of the recording for summaries.
const SUMMARY_QUERY: &str = "summary overview main points key topics";

/// One timestamped citation backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub start: f64,
    pub end: f64,
    pub relevance: f32,
}

/// Answer payload returned by `ask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub text: String,
    /// Ordered by descending relevance.
    pub citations: Vec<Citation>,
    /// Derived from retrieval scores, in [0, 1].
    pub confidence: f32,
}

/// One highlighted moment in a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub text: String,
    pub timestamp: f64,
    pub formatted_time: String,
}

/// Whole-recording summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureSummary {
    pub text: String,
    pub key_points: Vec<KeyPoint>,
    pub duration: f64,
}

/// Composes grounded answers from retrieval results.
pub struct AnswerComposer {
    retriever: Arc<Retriever>,
    generator: Arc<dyn crate::answer::generator::AnswerGenerator>,
    retrieval: RetrievalConfig,
    answer: AnswerConfig,
}

impl AnswerComposer {
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Arc<dyn crate::answer::generator::AnswerGenerator>,
        retrieval: RetrievalConfig,
        answer: AnswerConfig,
    ) -> Self {
        Self {
            retriever,
            generator,
            retrieval,
            answer,
        }
    }

    /// Answers a question about a recording.
    ///
    /// Citations always come from the retriever's chunk time ranges, never
    /// from the generated text, and confidence is derived from retrieval
    /// scores alone. With no grounding above the relevance floor the fixed
    /// "not found" answer is returned and the generator is never called.
    pub async fn answer(&self, id: RecordingId, query_text: &str) -> Result<GroundedAnswer> {
        let hits = self
            .retriever
            .search(id, query_text, self.retrieval.top_k)
            .await?;

        let grounded: Vec<SearchHit> = hits
            .into_iter()
            .filter(|hit| hit.score >= self.retrieval.relevance_floor)
            .collect();

        if grounded.is_empty() {
            debug!(%id, "no grounding above relevance floor");
            return Ok(GroundedAnswer {
                text: NOT_FOUND_ANSWER.to_string(),
                citations: Vec::new(),
                confidence: crate::defaults::NO_MATCH_CONFIDENCE,
            });
        }

        let prompt = build_prompt(query_text, &grounded);
        let text = self.generator.generate(&prompt).await.map_err(|e| {
            LecternError::ServiceUnavailable {
                message: e.to_string(),
            }
        })?;

        Ok(GroundedAnswer {
            text,
            citations: citations_from(&grounded, self.answer.citation_limit),
            confidence: confidence_from(&grounded),
        })
    }

    /// Summarizes the whole recording.
    ///
    /// Retrieves a cross-section with a fixed overview query and prompts
    /// for a structured summary; key points are the top retrieved moments.
    pub async fn summarize(&self, id: RecordingId) -> Result<LectureSummary> {
        let hits = self.retriever.search(id, SUMMARY_QUERY, SUMMARY_TOP_K).await?;

        if hits.is_empty() {
            return Ok(LectureSummary {
                text: "No content available for summary.".to_string(),
                key_points: Vec::new(),
                duration: 0.0,
            });
        }

        let prompt = build_summary_prompt(&hits);
        let text = self.generator.generate(&prompt).await.map_err(|e| {
            LecternError::ServiceUnavailable {
                message: e.to_string(),
            }
        })?;

        let duration = hits
            .iter()
            .map(|hit| hit.chunk.end)
            .fold(0.0f64, f64::max);

        Ok(LectureSummary {
            text,
            key_points: key_points_from(&hits),
            duration,
        })
    }
}

/// Grounding prompt: context blocks tagged with time ranges, then the question.
fn build_prompt(query_text: &str, hits: &[SearchHit]) -> String {
    let mut context = String::new();
    for hit in hits {
        context.push_str(&format!(
            "[{} - {}]\n{}\n\n",
            format_timestamp(hit.chunk.start),
            format_timestamp(hit.chunk.end),
            hit.chunk.text
        ));
    }

    format!(
        "You are a teaching assistant helping students understand a recorded lecture.\n\
         Based on the transcript passages below, each tagged with its time range,\n\
         answer the student's question.\n\n\
         LECTURE CONTEXT:\n{context}\n\
         STUDENT QUESTION: {query_text}\n\n\
         Instructions:\n\
         1. Answer based only on the provided passages\n\
         2. Mention the approximate timestamp when referencing a specific point\n\
         3. If the passages do not fully answer the question, say so\n\n\
         ANSWER:"
    )
}

fn build_summary_prompt(hits: &[SearchHit]) -> String {
    let mut context = String::new();
    for hit in hits {
        context.push_str(&format!(
            "[{} - {}]\n{}\n\n",
            format_timestamp(hit.chunk.start),
            format_timestamp(hit.chunk.end),
            hit.chunk.text
        ));
    }

    format!(
        "Based on the following lecture transcript passages, provide a concise\n\
         summary (2-3 paragraphs) followed by the key points covered.\n\n\
         LECTURE CONTEXT:\n{context}\n\
         STUDENT QUESTION: summarize this lecture\n\n\
         ANSWER:"
    )
}

/// Citations: top hits by descending relevance, capped at `limit`.
fn citations_from(hits: &[SearchHit], limit: usize) -> Vec<Citation> {
    let mut citations: Vec<Citation> = hits
        .iter()
        .map(|hit| Citation {
            start: hit.chunk.start,
            end: hit.chunk.end,
            relevance: hit.score,
        })
        .collect();
    citations.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    citations.truncate(limit);
    citations
}

/// Confidence from retrieval scores: average relevance weighted 0.7, plus a
/// chunk-count factor (saturating at 3 chunks) weighted 0.3, capped at 1.
fn confidence_from(hits: &[SearchHit]) -> f32 {
    if hits.is_empty() {
        return 0.0;
    }
    let avg: f32 = hits.iter().map(|h| h.score).sum::<f32>() / hits.len() as f32;
    let count_factor = (hits.len() as f32 / 3.0).min(1.0);
    (avg * 0.7 + count_factor * 0.3).min(1.0)
}

/// Key points: leading text of the top 5 moments with formatted timestamps.
fn key_points_from(hits: &[SearchHit]) -> Vec<KeyPoint> {
    hits.iter()
        .take(5)
        .map(|hit| {
            let mut text = hit.chunk.text.clone();
            if text.len() > 200 {
                let cut = text
                    .char_indices()
                    .take_while(|(i, _)| *i <= 200)
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                text.truncate(cut);
                text.push_str("...");
            }
            KeyPoint {
                text,
                timestamp: hit.chunk.start,
                formatted_time: format_timestamp(hit.chunk.start),
            }
        })
        .collect()
}

/// Formats seconds as `MM:SS`, or `HH:MM:SS` past the first hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
