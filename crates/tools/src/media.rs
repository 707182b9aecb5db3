//! Image and video batch tools.

use {
    async_trait::async_trait,
    serde_json::Value,
    yatools_messages::{MessageKind, Role},
};

use crate::{
    context::{BatchOutcome, MessageTool, ToolContext, skip_item},
    error::Result,
    input::OneOrMany,
};

/// Send each URL in order, persisting one envelope per URL.
///
/// Blank entries are skipped. A failed entry is recorded and the batch moves on.
async fn send_urls(ctx: &ToolContext, kind: MessageKind, urls: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        if url.trim().is_empty() {
            skip_item(kind, index, "blank url");
            continue;
        }
        let result = ctx
            .deliver(kind, Value::String(url.clone()), Role::MediaAssistant)
            .await;
        outcome.record(kind, index, result);
    }
    outcome
}

pub struct ImageTool {
    urls: Vec<String>,
}

impl ImageTool {
    pub fn new(urls: impl Into<OneOrMany<String>>) -> Self {
        Self {
            urls: urls.into().into_vec(),
        }
    }
}

#[async_trait]
impl MessageTool for ImageTool {
    type Output = BatchOutcome;

    fn name(&self) -> &'static str {
        "image"
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output> {
        Ok(send_urls(ctx, MessageKind::Image, &self.urls).await)
    }
}

pub struct VideoTool {
    urls: Vec<String>,
}

impl VideoTool {
    pub fn new(urls: impl Into<OneOrMany<String>>) -> Self {
        Self {
            urls: urls.into().into_vec(),
        }
    }
}

#[async_trait]
impl MessageTool for VideoTool {
    type Output = BatchOutcome;

    fn name(&self) -> &'static str {
        "video"
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output> {
        Ok(send_urls(ctx, MessageKind::Video, &self.urls).await)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::{FailingStore, FlakySender, Harness, context_with},
        serde_json::json,
        std::sync::Arc,
    };

    #[tokio::test]
    async fn scalar_url_becomes_single_item_batch() {
        let h = Harness::new();
        let ids = ImageTool::new("https://cdn/x.jpg")
            .execute(&h.ctx)
            .await
            .unwrap()
            .sent;

        assert_eq!(ids, vec!["ext-1"]);
        let envs = h.envelopes().await;
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].role, Role::MediaAssistant);
        assert_eq!(
            serde_json::to_value(&envs[0].data).unwrap(),
            json!({"url": "https://cdn/x.jpg", "mime_type": "image/jpeg"})
        );
    }

    #[tokio::test]
    async fn batch_preserves_order_one_insert_per_item() {
        let h = Harness::new();
        let urls = vec![
            "https://cdn/1.mp4".to_string(),
            "https://cdn/2.mp4".to_string(),
            "https://cdn/3.mp4".to_string(),
        ];
        let ids = VideoTool::new(urls.clone())
            .execute(&h.ctx)
            .await
            .unwrap()
            .sent;

        let envs = h.envelopes().await;
        assert_eq!(ids.len(), 3);
        assert_eq!(envs.len(), 3);
        for ((id, env), url) in ids.iter().zip(&envs).zip(&urls) {
            assert_eq!(&env.external_id, id);
            assert_eq!(env.kind, MessageKind::Video);
            assert_eq!(env.data.as_media().unwrap().url, *url);
            assert_eq!(
                env.data.as_media().unwrap().mime_type.as_deref(),
                Some("video/mp4")
            );
        }
    }

    #[tokio::test]
    async fn blank_urls_are_skipped() {
        let h = Harness::new();
        let ids = ImageTool::new(vec![
            "https://cdn/a.jpg".to_string(),
            "  ".to_string(),
            String::new(),
            "https://cdn/b.jpg".to_string(),
        ])
        .execute(&h.ctx)
        .await
        .unwrap()
        .sent;

        assert_eq!(ids, vec!["ext-1", "ext-2"]);
        assert_eq!(h.store.len().await, 2);
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let h = Harness::new();
        let outcome = ImageTool::new(Vec::<String>::new())
            .execute(&h.ctx)
            .await
            .unwrap();
        assert_eq!(outcome, BatchOutcome::default());
        assert!(!outcome.is_total_failure());
        assert!(h.sender.requests().is_empty());
    }

    #[tokio::test]
    async fn send_failure_mid_batch_keeps_going() {
        let h = Harness::new();
        let sender = Arc::new(FlakySender::failing_on(2));
        let ctx = context_with(h.store.clone(), sender.clone());
        let outcome = ImageTool::new(vec![
            "https://cdn/1.jpg".to_string(),
            "https://cdn/2.jpg".to_string(),
            "https://cdn/3.jpg".to_string(),
        ])
        .execute(&ctx)
        .await
        .unwrap();

        assert_eq!(outcome.sent, vec!["ext-1", "ext-3"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].index, 1);
        assert!(outcome.failed[0].error.contains("gateway unavailable"));
        assert!(!outcome.is_total_failure());
        assert_eq!(sender.calls(), 3);

        let urls: Vec<_> = h
            .envelopes()
            .await
            .iter()
            .map(|e| e.data.as_media().unwrap().url.clone())
            .collect();
        assert_eq!(urls, vec!["https://cdn/1.jpg", "https://cdn/3.jpg"]);
    }

    #[tokio::test]
    async fn store_failure_on_every_item_is_total_failure() {
        let h = Harness::new();
        let ctx = context_with(Arc::new(FailingStore), h.sender.clone());
        let outcome = ImageTool::new(vec!["https://a".to_string(), "https://b".to_string()])
            .execute(&ctx)
            .await
            .unwrap();

        assert!(outcome.sent.is_empty());
        assert_eq!(
            outcome.failed.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(outcome.is_total_failure());
        assert_eq!(h.sender.requests().len(), 2);
    }
}
