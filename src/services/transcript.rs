// src/services/transcript.rs
//! Video-ID extraction and caption retrieval for submitted YouTube URLs

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Transcript text is truncated to this many characters before it is
/// embedded in a prompt, to bound downstream prompt size
pub const MAX_TRANSCRIPT_CHARS: usize = 12_000;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("no captions available for this video")]
    NoCaptions,

    #[error("caption request failed: {0}")]
    RequestFailed(String),

    #[error("could not extract a video id from the URL")]
    InvalidUrl,
}

#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Fetches caption tracks for YouTube videos
#[derive(Debug)]
pub struct TranscriptService {
    client: Client,
    watch_re: Regex,
    short_link_re: Regex,
    shorts_re: Regex,
    embed_re: Regex,
}

impl TranscriptService {
    pub fn new(client: Client) -> Self {
        // Video ids are always 11 characters of [A-Za-z0-9_-]
        Self {
            client,
            watch_re: Regex::new(r"[?&]v=([A-Za-z0-9_-]{11})").expect("invalid watch regex"),
            short_link_re: Regex::new(r"youtu\.be/([A-Za-z0-9_-]{11})")
                .expect("invalid short link regex"),
            shorts_re: Regex::new(r"/shorts/([A-Za-z0-9_-]{11})").expect("invalid shorts regex"),
            embed_re: Regex::new(r"/embed/([A-Za-z0-9_-]{11})").expect("invalid embed regex"),
        }
    }

    /// Extract the platform video identifier from a URL, matching the
    /// known shapes: `watch?v=`, `youtu.be/`, `/shorts/`, `/embed/`
    pub fn extract_video_id(&self, url: &str) -> Option<String> {
        for re in [
            &self.watch_re,
            &self.short_link_re,
            &self.shorts_re,
            &self.embed_re,
        ] {
            if let Some(caps) = re.captures(url) {
                return caps.get(1).map(|m| m.as_str().to_string());
            }
        }
        None
    }

    /// Retrieve the English caption track for a video id
    pub async fn fetch_captions(&self, video_id: &str) -> Result<String, TranscriptError> {
        let url = format!(
            "https://www.youtube.com/api/timedtext?v={}&lang=en&fmt=json3",
            urlencoding::encode(video_id)
        );

        debug!(video_id = %video_id, "Fetching caption track");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(error = %e, video_id = %video_id, "HTTP error fetching captions");
            TranscriptError::RequestFailed(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(TranscriptError::NoCaptions);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscriptError::RequestFailed(e.to_string()))?;

        // Videos without captions answer with an empty body
        if body.trim().is_empty() {
            return Err(TranscriptError::NoCaptions);
        }

        let parsed: TimedTextResponse =
            serde_json::from_str(&body).map_err(|_| TranscriptError::NoCaptions)?;

        let text = parsed
            .events
            .iter()
            .flat_map(|event| event.segs.iter())
            .map(|seg| seg.utf8.as_str())
            .collect::<Vec<_>>()
            .join("")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            return Err(TranscriptError::NoCaptions);
        }

        info!(
            video_id = %video_id,
            chars = text.len(),
            "Caption track retrieved"
        );

        Ok(text)
    }

    /// Resolve a URL to caption text: extract the id, then fetch
    pub async fn fetch_from_url(&self, url: &str) -> Result<String, TranscriptError> {
        let video_id = self
            .extract_video_id(url)
            .ok_or(TranscriptError::InvalidUrl)?;
        self.fetch_captions(&video_id).await
    }
}

/// Truncate transcript text to the prompt budget, marking the cut with a
/// trailing ellipsis
pub fn truncate_transcript(text: &str) -> String {
    if text.chars().count() <= MAX_TRANSCRIPT_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_TRANSCRIPT_CHARS).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TranscriptService {
        TranscriptService::new(Client::new())
    }

    #[test]
    fn test_extract_video_id_watch_url() {
        let svc = service();
        assert_eq!(
            svc.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        // Extra query parameters before and after the id
        assert_eq!(
            svc.extract_video_id("https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_short_link() {
        let svc = service();
        assert_eq!(
            svc.extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            svc.extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=10"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_shorts_and_embed() {
        let svc = service();
        assert_eq!(
            svc.extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            svc.extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_rejects_non_video_urls() {
        let svc = service();
        assert_eq!(svc.extract_video_id("https://example.com/watch?v=short"), None);
        assert_eq!(svc.extract_video_id("https://www.youtube.com/"), None);
        assert_eq!(svc.extract_video_id("not a url"), None);
    }

    #[test]
    fn test_truncate_transcript_short_text_untouched() {
        let text = "a short transcript";
        assert_eq!(truncate_transcript(text), text);
    }

    #[test]
    fn test_truncate_transcript_caps_length() {
        let text = "x".repeat(MAX_TRANSCRIPT_CHARS + 500);
        let truncated = truncate_transcript(&text);

        assert_eq!(truncated.chars().count(), MAX_TRANSCRIPT_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }
}
