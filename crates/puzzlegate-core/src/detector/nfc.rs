//! Text extraction from NDEF tag reads.
//!
//! The NFC level shows the text of the first record of the first message in
//! a read. Tag content never decides an unlock.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefRecord {
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefMessage {
    pub records: Vec<NdefRecord>,
}

/// UTF-8 payload of the first record of the first message.
///
/// Returns `None` when there is no record or the payload is not valid UTF-8.
pub fn decode_text_payload(messages: &[NdefMessage]) -> Option<String> {
    let record = messages.first()?.records.first()?;
    String::from_utf8(record.payload.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(payloads: &[&[u8]]) -> NdefMessage {
        NdefMessage {
            records: payloads
                .iter()
                .map(|p| NdefRecord {
                    payload: p.to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn reads_first_record_only() {
        let messages = vec![message(&[b"hello", b"ignored"]), message(&[b"later"])];
        assert_eq!(decode_text_payload(&messages).as_deref(), Some("hello"));
    }

    #[test]
    fn empty_reads_yield_nothing() {
        assert_eq!(decode_text_payload(&[]), None);
        assert_eq!(decode_text_payload(&[NdefMessage::default()]), None);
    }

    #[test]
    fn invalid_utf8_yields_nothing() {
        let messages = vec![message(&[&[0xff, 0xfe]])];
        assert_eq!(decode_text_payload(&messages), None);
    }
}
