use {
    async_trait::async_trait,
    serde_json::Value,
    yatools_messages::{MediaData, MessageData, MessageKind, Role, mime_type_for},
};

use crate::{
    context::{BatchOutcome, MessageTool, ToolContext, skip_item},
    error::Result,
};

/// Sends `{url, filename}` documents in order. A failed document does not stop
/// the ones after it.
pub struct DocumentTool {
    files: Vec<Value>,
}

impl DocumentTool {
    pub fn new(files: Vec<Value>) -> Self {
        Self { files }
    }
}

/// `(url, filename)` when the entry is a mapping carrying both as strings.
fn document_parts(file: &Value) -> Option<(&str, &str)> {
    let file = file.as_object()?;
    let url = file.get("url")?.as_str()?;
    let filename = file.get("filename")?.as_str()?;
    Some((url, filename))
}

#[async_trait]
impl MessageTool for DocumentTool {
    type Output = BatchOutcome;

    fn name(&self) -> &'static str {
        "document"
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output> {
        let kind = MessageKind::Document;
        let mut outcome = BatchOutcome::with_capacity(self.files.len());
        for (index, file) in self.files.iter().enumerate() {
            let Some((url, filename)) = document_parts(file) else {
                skip_item(kind, index, "document needs string url and filename");
                continue;
            };
            let data = MessageData::Media(
                MediaData::new(url, mime_type_for(kind)).with_filename(filename),
            );
            let result = ctx.deliver_data(kind, data, Role::MediaAssistant).await;
            outcome.record(kind, index, result);
        }
        Ok(outcome)
    }
}
