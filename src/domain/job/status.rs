//! Job Context - Status Snapshot

use serde::{Deserialize, Deserializer, Serialize};

use super::{JobId, JobState};
use crate::domain::book::GeneratedBook;

/// 任务状态快照（提交响应与轮询响应共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub job_id: JobId,
    pub status: JobState,
    /// 0-100，线上可能是整数或小数
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub message: String,
    /// 仅在 status=complete 时出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GeneratedBook>,
}

impl GenerationStatus {
    pub fn pending(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Pending,
            progress: 0,
            message: String::new(),
            result: None,
        }
    }

    pub fn generating(job_id: impl Into<JobId>, progress: u8, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Generating,
            progress,
            message: message.into(),
            result: None,
        }
    }

    pub fn complete(job_id: impl Into<JobId>, result: Option<GeneratedBook>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Complete,
            progress: 100,
            message: String::new(),
            result,
        }
    }

    pub fn failed(job_id: impl Into<JobId>, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Failed,
            progress: 0,
            message: message.into(),
            result: None,
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// 非空白的消息
    pub fn message(&self) -> Option<&str> {
        let message = self.message.trim();
        (!message.is_empty()).then_some(message)
    }
}

fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_integer_progress() {
        let status: GenerationStatus = serde_json::from_str(
            r#"{"job_id":"job-1","status":"generating","progress":60,"message":"Drawing page 3"}"#,
        )
        .unwrap();
        assert_eq!(status.job_id.as_str(), "job-1");
        assert_eq!(status.status, JobState::Generating);
        assert_eq!(status.progress, 60);
        assert_eq!(status.message(), Some("Drawing page 3"));
        assert!(status.result.is_none());
    }

    #[test]
    fn test_deserialize_fractional_and_out_of_range_progress() {
        let status: GenerationStatus =
            serde_json::from_str(r#"{"job_id":"j","status":"pending","progress":42.6,"message":""}"#)
                .unwrap();
        assert_eq!(status.progress, 43);
        assert_eq!(status.message(), None);

        let status: GenerationStatus =
            serde_json::from_str(r#"{"job_id":"j","status":"pending","progress":250}"#).unwrap();
        assert_eq!(status.progress, 100);

        let status: GenerationStatus =
            serde_json::from_str(r#"{"job_id":"j","status":"pending","progress":null}"#).unwrap();
        assert_eq!(status.progress, 0);
    }

    #[test]
    fn test_deserialize_complete_with_result() {
        let status: GenerationStatus = serde_json::from_str(
            r#"{
                "job_id": "job-9",
                "status": "complete",
                "progress": 100,
                "message": "Done",
                "result": {
                    "book_id": "b1",
                    "title": "Dino Days",
                    "theme": "Dinosaurs",
                    "page_count": 1,
                    "pages": [{
                        "page_number": 1,
                        "scene_description": "A T-rex baking",
                        "image_url": "https://cdn/1.png",
                        "thumbnail_url": "https://cdn/1_t.png"
                    }],
                    "pdf_url": "https://cdn/b1.pdf",
                    "created_at": "2024-01-01T00:00:00Z",
                    "user_uid": "u1"
                }
            }"#,
        )
        .unwrap();
        let book = status.result.unwrap();
        assert_eq!(book.pages.len(), 1);
        assert_eq!(book.cover_thumbnail(), Some("https://cdn/1_t.png"));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_str::<GenerationStatus>(
            r#"{"job_id":"j","status":"exploded","progress":0,"message":""}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Complete.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Generating.is_terminal());
    }
}
