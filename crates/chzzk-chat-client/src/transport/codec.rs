//! Decode-once codec for the transport layer.
//!
//! - Text frames (and UTF-8 binary frames) => queued text
//! - Ping/Pong are answered by tungstenite itself and never queued
//! - Close ends the session cleanly

use tokio_tungstenite::tungstenite::Message;

use chzzk_chat_core::error::ChatError;

/// Element of the reader -> dispatcher queue.
#[derive(Debug)]
pub enum Frame {
    /// Raw frame text, in socket order.
    Text(String),
    /// Terminal transport failure; always the last element.
    Closed(ChatError),
}

/// What one socket message means to the reader.
#[derive(Debug)]
pub enum Inbound {
    Text(String),
    Close,
    /// Control or undecodable data; nothing to queue.
    Skip,
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Text(s.as_str().to_owned()),
        Message::Binary(b) => match String::from_utf8(b.to_vec()) {
            Ok(s) => Inbound::Text(s),
            Err(_) => {
                tracing::warn!(len = b.len(), "dropping non-utf8 binary frame");
                Inbound::Skip
            }
        },
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Skip,
        Message::Close(_) => Inbound::Close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_queued_verbatim() {
        match decode(Message::text(r#"{"cmd":0}"#)) {
            Inbound::Text(s) => assert_eq!(s, r#"{"cmd":0}"#),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn utf8_binary_is_text() {
        match decode(Message::binary(br#"{"cmd":0}"#.to_vec())) {
            Inbound::Text(s) => assert_eq!(s, r#"{"cmd":0}"#),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(decode(Message::binary(vec![0xff, 0xfe])), Inbound::Skip));
    }

    #[test]
    fn control_frames_are_skipped() {
        assert!(matches!(decode(Message::Ping(Default::default())), Inbound::Skip));
        assert!(matches!(decode(Message::Pong(Default::default())), Inbound::Skip));
        assert!(matches!(decode(Message::Close(None)), Inbound::Close));
    }
}
