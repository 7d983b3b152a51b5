use crate::errors::ProviderError;
use crate::stream::StreamFragment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Parses whatever is left once the byte stream has ended.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buf);
        parse_sse_frame(&rest)
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Returns `true` for the `[DONE]` sentinel that ends a chat-completions stream.
pub(crate) fn is_done_frame(frame: &SseFrame) -> bool {
    frame.data.trim() == "[DONE]"
}

pub(crate) fn map_openai_frame_to_fragments(
    provider: &crate::ProviderId,
    frame: &SseFrame,
) -> Result<Vec<StreamFragment>, ProviderError> {
    if frame.data.trim().is_empty() || is_done_frame(frame) {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(&frame.data).map_err(|e| {
        ProviderError::protocol(provider.clone(), format!("invalid SSE JSON frame: {e}"))
    })?;
    map_chat_chunk_to_fragments(provider, &value)
}

/// Maps one `chat.completion.chunk` object to fragments.
pub(crate) fn map_chat_chunk_to_fragments(
    provider: &crate::ProviderId,
    value: &serde_json::Value,
) -> Result<Vec<StreamFragment>, ProviderError> {
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("OpenAI stream error");
        return Err(ProviderError::provider(provider.clone(), message, None));
    }

    let mut fragments = Vec::new();
    let Some(choice) = value
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
    else {
        return Ok(fragments);
    };

    if let Some(delta) = choice.get("delta") {
        if let Some(reasoning) = delta
            .get("reasoning_content")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        {
            fragments.push(StreamFragment::ReasoningDelta {
                text: reasoning.to_string(),
            });
        }
        if let Some(content) = delta
            .get("content")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        {
            fragments.push(StreamFragment::text(content));
        }
    }
    if let Some(reason) = choice.get("finish_reason").and_then(|v| v.as_str()) {
        fragments.push(StreamFragment::Finish {
            finish_reason: Some(reason.to_string()),
        });
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let part1 = b"data: {\"choices\":[{\"delta\":{\"content\":\"hel";
        let part2 = b"lo\"}}]}\n\ndata: [DONE]\n\n";
        assert!(decoder.push_chunk(part1).is_empty());
        let frames = decoder.push_chunk(part2);
        assert_eq!(frames.len(), 2);
        assert!(frames[0].data.contains("hello"));
        assert!(is_done_frame(&frames[1]));
    }

    #[test]
    fn sse_decoder_accepts_crlf_delimiters_and_comments() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b": keep-alive\r\n\r\nevent: message\r\ndata: {}\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("message"));
        assert_eq!(frames[0].data, "{}");
    }

    #[test]
    fn sse_decoder_finish_parses_unterminated_tail() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"data: [DONE]").is_empty());
        let tail = decoder.finish().expect("tail frame");
        assert!(is_done_frame(&tail));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn maps_content_delta_and_finish_reason() {
        let provider = crate::ProviderId::new("openai");
        let delta = serde_json::json!({"choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]});
        assert_eq!(
            map_chat_chunk_to_fragments(&provider, &delta).expect("delta"),
            vec![StreamFragment::text("Hi")]
        );

        let last = serde_json::json!({"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]});
        assert_eq!(
            map_chat_chunk_to_fragments(&provider, &last).expect("finish"),
            vec![StreamFragment::Finish {
                finish_reason: Some("stop".into())
            }]
        );
    }

    #[test]
    fn role_only_and_usage_chunks_map_to_nothing() {
        let provider = crate::ProviderId::new("openai");
        let role = serde_json::json!({"choices":[{"delta":{"role":"assistant","content":""}}]});
        let usage = serde_json::json!({"choices":[],"usage":{"total_tokens":12}});
        assert!(map_chat_chunk_to_fragments(&provider, &role).expect("role").is_empty());
        assert!(map_chat_chunk_to_fragments(&provider, &usage).expect("usage").is_empty());
    }

    #[test]
    fn maps_error_payload_to_provider_error() {
        let provider = crate::ProviderId::new("openai");
        let failed = serde_json::json!({"error": { "message": "quota exceeded" }});
        let err = map_chat_chunk_to_fragments(&provider, &failed).expect_err("should fail");
        assert!(matches!(
            err,
            ProviderError::Provider { ref message, status_code: None, .. } if message == "quota exceeded"
        ));
    }

    #[test]
    fn invalid_json_frame_is_protocol_error() {
        let provider = crate::ProviderId::new("openai");
        let frame = SseFrame {
            event: None,
            data: "{not json".into(),
        };
        assert!(matches!(
            map_openai_frame_to_fragments(&provider, &frame),
            Err(ProviderError::Protocol { .. })
        ));
    }
}
