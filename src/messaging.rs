use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Text message handed to the messaging bridge for delivery.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OutgoingMessage {
    /// Topic the bridge listens on.
    pub topic: String,
    pub to: String,
    pub from: String,
    pub body: String,
    /// Optional picture for MMS; empty for plain SMS.
    pub media_url: String,
}

/// Payload published on the bridge topic.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutgoingPayload<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    media_url: &'a str,
    #[serde(rename = "Type")]
    kind: &'a str,
}

impl OutgoingMessage {
    pub fn to_json(&self) -> Result<String> {
        let payload = OutgoingPayload {
            to: &self.to,
            from: &self.from,
            body: &self.body,
            media_url: &self.media_url,
            kind: "Outgoing",
        };

        Ok(serde_json::to_string(&payload)?)
    }
}

/// Message forwarded from the bridge, e.g. someone texting the station.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IncomingMessage {
    /// The station's number the message was sent to.
    pub to: String,
    pub from: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
}

impl IncomingMessage {
    pub fn from_json(data: &[u8]) -> Result<IncomingMessage> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Our own outgoing messages are echoed back on the same topic.
    pub fn is_incoming(&self) -> bool {
        self.kind == "Incoming"
    }
}

/// SMS/MMS delivery.
pub trait Messenger {
    fn send(&mut self, message: &OutgoingMessage) -> Result<()>;
}
