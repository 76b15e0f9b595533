/// One file attached to the digest email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub mime_type: &'static str,
}

impl Attachment {
    pub fn png(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
            mime_type: "image/png",
        }
    }
}
