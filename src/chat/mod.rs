use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};

use crate::error::FinderError;

/// A boxed, finite stream of reply fragments. It can be consumed only once.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, FinderError>> + Send>>;

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Instructions that frame the whole conversation
    System,
    /// The user/human participant in the conversation
    User,
    /// The AI assistant participant in the conversation
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// The role of who sent this message
    pub role: ChatRole,
    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new builder for a system message
    pub fn system() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::System)
    }

    /// Create a new builder for a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Create a new builder for an assistant message
    pub fn assistant() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Assistant)
    }
}

/// Builder for ChatMessage
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    content: String,
}

impl ChatMessageBuilder {
    /// Create a new ChatMessageBuilder with specified role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            content: String::new(),
        }
    }

    /// Set the message content
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Build the ChatMessage
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content,
        }
    }
}

/// Trait for providers that support chat-style interactions.
#[async_trait]
pub trait ChatProvider: Sync + Send {
    /// Sends a streaming chat request to the provider with a sequence of messages.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation as a slice of chat messages
    ///
    /// # Returns
    ///
    /// A stream of text fragments or an error
    async fn chat_stream(&self, _messages: &[ChatMessage]) -> Result<ChatStream, FinderError> {
        Err(FinderError::Generic(
            "Streaming not supported for this provider".to_string(),
        ))
    }

    /// Sends a chat request and waits for the whole reply.
    ///
    /// Stops at the first failing fragment; nothing received before it is returned.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, FinderError> {
        let mut stream = self.chat_stream(messages).await?;
        let mut reply = String::new();
        while let Some(fragment) = stream.next().await {
            reply.push_str(&fragment?);
        }
        Ok(reply)
    }
}

/// Accumulates raw bytes and hands out complete SSE `data:` payloads.
///
/// Network chunks can split a line, or a multi-byte character, anywhere;
/// lines are decoded once their newline arrives, or at end of input.
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
    done: bool,
}

impl SseBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut payloads = Vec::new();
        while !self.done {
            let Some(pos) = self.pending.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.decode_line(&line, &mut payloads);
        }
        payloads
    }

    /// Decodes a last line the body left without a trailing newline.
    fn finish(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();
        if !self.done && !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.decode_line(&line, &mut payloads);
        }
        self.done = true;
        payloads
    }

    fn decode_line(&mut self, line: &[u8], payloads: &mut Vec<String>) {
        let line = String::from_utf8_lossy(line);
        if let Some(data) = line.trim().strip_prefix("data:") {
            let data = data.trim_start();
            if data == "[DONE]" {
                self.done = true;
                self.pending.clear();
            } else {
                payloads.push(data.to_string());
            }
        }
    }
}

/// Creates a Server-Sent Events (SSE) stream from a byte stream.
///
/// # Arguments
///
/// * `bytes` - The body of the streaming HTTP response
/// * `parser` - Function to parse each `data:` payload into optional text content
///
/// # Returns
///
/// A pinned stream of text fragments. It ends at `data: [DONE]` or when the body ends.
pub(crate) fn create_sse_stream<S, B, E, F>(bytes: S, parser: F) -> ChatStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
    F: Fn(&str) -> Result<Option<String>, FinderError> + Send + 'static,
{
    // `None` marks the end of the body so the buffer can be flushed.
    let stream = bytes
        .map(Some)
        .chain(stream::once(futures::future::ready(None)))
        .scan(SseBuffer::default(), move |buffer, chunk| {
            if buffer.done {
                return futures::future::ready(None);
            }
            let payloads = match chunk {
                Some(Ok(bytes)) => buffer.push(bytes.as_ref()),
                Some(Err(e)) => {
                    return futures::future::ready(Some(vec![Err(FinderError::HttpError(
                        e.to_string(),
                    ))]))
                }
                None => buffer.finish(),
            };
            let items: Vec<Result<String, FinderError>> = payloads
                .iter()
                .filter_map(|data| parser(data.as_str()).transpose())
                .collect();
            futures::future::ready(Some(items))
        })
        .flat_map(stream::iter);

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(data: &str) -> Result<Option<String>, FinderError> {
        if data.is_empty() {
            Ok(None)
        } else {
            Ok(Some(data.to_string()))
        }
    }

    async fn collect(chunks: Vec<Result<&'static str, String>>) -> Vec<Result<String, FinderError>> {
        create_sse_stream(stream::iter(chunks), echo).collect().await
    }

    #[tokio::test]
    async fn joins_lines_split_across_chunks() {
        let out = collect(vec![Ok("data: Hel"), Ok("lo\n\ndata: world\n\n")]).await;
        let out: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(out, vec!["Hello", "world"]);
    }

    #[tokio::test]
    async fn flushes_last_line_without_newline() {
        let out = collect(vec![Ok("data: Watch \n\ndata: Heat.")]).await;
        let out: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(out, vec!["Watch", "Heat."]);
    }

    #[tokio::test]
    async fn done_marker_without_newline_ends_cleanly() {
        let out = collect(vec![Ok("data: a\n\ndata: [DONE]")]).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), "a");
    }

    #[tokio::test]
    async fn stops_at_done_marker() {
        let out = collect(vec![Ok("data: a\n\ndata: [DONE]\n\n"), Ok("data: late\n\n")]).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), "a");
    }

    #[tokio::test]
    async fn ignores_comments_and_event_lines() {
        let out = collect(vec![Ok(": keep-alive\nevent: message\ndata: x\n\n")]).await;
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn transport_errors_surface_as_http_errors() {
        let out = collect(vec![Ok("data: a\n"), Err("connection reset".to_string())]).await;
        assert!(matches!(out[1], Err(FinderError::HttpError(_))));
    }

    #[tokio::test]
    async fn chat_folds_the_stream() {
        struct Fixed;

        #[async_trait]
        impl ChatProvider for Fixed {
            async fn chat_stream(&self, _m: &[ChatMessage]) -> Result<ChatStream, FinderError> {
                Ok(Box::pin(stream::iter(vec![
                    Ok("Try ".to_string()),
                    Ok("Heat.".to_string()),
                ])))
            }
        }

        let reply = Fixed.chat(&[ChatMessage::user().content("hi").build()]).await.unwrap();
        assert_eq!(reply, "Try Heat.");
    }

    #[test]
    fn builders_set_role_and_content() {
        let msg = ChatMessage::system().content("be brief").build();
        assert_eq!(msg.role, ChatRole::System);
        assert_eq!(msg.content, "be brief");
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
    }
}
