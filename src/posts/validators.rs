// src/posts/validators.rs

use super::models::{GenerateRequest, SavePostRequest};
use crate::common::{ValidationResult, Validator};

/// Transcript submissions shorter than this are almost certainly noise
const MIN_TRANSCRIPT_CHARS: usize = 50;

pub struct GenerateValidator;

impl Validator<GenerateRequest> for GenerateValidator {
    fn validate(&self, data: &GenerateRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let has_url = data
            .youtube_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false);
        let has_transcript = data
            .transcript
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);

        if !has_url && !has_transcript {
            result.add_error(
                "youtube_url",
                "Provide a YouTube URL or paste a transcript",
            );
        }

        if has_transcript {
            let len = data.transcript.as_deref().unwrap_or("").trim().len();
            if len < MIN_TRANSCRIPT_CHARS {
                result.add_error(
                    "transcript",
                    "Pasted transcript is too short to generate a post from",
                );
            }
        }

        result
    }
}

pub struct SavePostValidator;

impl Validator<SavePostRequest> for SavePostValidator {
    fn validate(&self, data: &SavePostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Title is required");
        } else if data.title.len() > 300 {
            result.add_error("title", "Title must be less than 300 characters");
        }

        if data.meta_description.len() > 500 {
            result.add_error(
                "meta_description",
                "Meta description must be less than 500 characters",
            );
        }

        if data.seo_keywords.len() > 500 {
            result.add_error("seo_keywords", "Keywords must be less than 500 characters");
        }

        result
    }
}
