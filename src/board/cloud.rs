use anyhow::Result;
use std::{cell::RefCell, rc::Rc, sync::mpsc::Sender, time::Duration};

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
use log::{debug, error, info, warn};

use weather_station::{
    error::{Error, ErrorKind},
    IncomingMessage, Messenger, OutgoingMessage, ShadowDelta, ShadowDocument, ShadowState,
    ShadowSync, StationConfig,
};

use super::{MQTT_CLIENT_ID, MQTT_URL};

const SUBSCRIBE_ATTEMPTS: u32 = 10;

/// Events decoded on the MQTT thread, handed to the main loop.
#[derive(Debug)]
pub enum Inbox {
    Delta(ShadowDelta),
    Message(IncomingMessage),
}

type Client = Rc<RefCell<EspMqttClient<'static>>>;

pub struct ShadowLink {
    client: Client,
    topic: String,
}

pub struct MessageLink {
    client: Client,
}

fn publish(
    client: &Client,
    topic: &str,
    payload: &str,
    kind: ErrorKind,
) -> weather_station::Result<()> {
    debug!("Publishing to {}: {}", topic, payload);
    client
        .borrow_mut()
        .publish(topic, QoS::AtLeastOnce, false, payload.as_bytes())
        .map(|_| ())
        .map_err(|e| Error::new(kind, e))
}

impl ShadowSync for ShadowLink {
    fn report_state(&mut self, state: &ShadowState) -> weather_station::Result<()> {
        let json = ShadowDocument::reported(state.clone()).to_json()?;
        publish(&self.client, &self.topic, &json, ErrorKind::ShadowSync)
    }

    fn request_state(&mut self, state: &ShadowState) -> weather_station::Result<()> {
        let json = ShadowDocument::desired(state.clone()).to_json()?;
        publish(&self.client, &self.topic, &json, ErrorKind::ShadowSync)
    }
}

impl Messenger for MessageLink {
    fn send(&mut self, message: &OutgoingMessage) -> weather_station::Result<()> {
        let json = message.to_json()?;
        publish(&self.client, &message.topic, &json, ErrorKind::DeliveryFailed)
    }
}

fn decode(topic: &str, data: &[u8], delta_topic: &str, messaging_topic: &str) -> Option<Inbox> {
    let decoded = if topic == delta_topic {
        ShadowDelta::from_json(data).map(Inbox::Delta)
    } else if topic == messaging_topic {
        IncomingMessage::from_json(data).map(Inbox::Message)
    } else {
        debug!("Ignoring message on {}", topic);
        return None;
    };

    decoded
        .map_err(|e| warn!("Dropping message on {}: {}", topic, e))
        .ok()
}

/// Connects to the broker, starts the listener thread and subscribes to the
/// shadow delta and messaging topics.
pub fn connect(config: &StationConfig, inbox: Sender<Inbox>) -> Result<(ShadowLink, MessageLink)> {
    let mqtt_config = MqttClientConfiguration {
        client_id: Some(MQTT_CLIENT_ID),
        keep_alive_interval: Some(Duration::from_secs(30)),
        ..Default::default()
    };

    let (mut client, mut connection) = EspMqttClient::new(MQTT_URL, &mqtt_config)?;

    let delta_topic = format!("{}/delta", config.shadow_topic);
    let messaging_topic = config.messaging_topic.clone();

    {
        let delta_topic = delta_topic.clone();
        let messaging_topic = messaging_topic.clone();

        std::thread::Builder::new()
            .stack_size(8192)
            .spawn(move || {
                info!("MQTT listener started");
                while let Ok(event) = connection.next() {
                    match event.payload() {
                        EventPayload::Received {
                            topic: Some(topic),
                            data,
                            ..
                        } => {
                            let event = decode(topic, data, &delta_topic, &messaging_topic);
                            if let Some(event) = event {
                                if inbox.send(event).is_err() {
                                    break;
                                }
                            }
                        }
                        EventPayload::Connected(_) => info!("MQTT connected"),
                        EventPayload::Disconnected => warn!("MQTT disconnected"),
                        EventPayload::Error(e) => error!("MQTT error: {:?}", e),
                        _ => {}
                    }
                }
                info!("MQTT connection closed");
            })?;
    }

    for topic in [delta_topic.as_str(), messaging_topic.as_str()] {
        let mut attempt = 1;
        loop {
            match client.subscribe(topic, QoS::AtLeastOnce) {
                Ok(_) => {
                    info!("Subscribed to {}", topic);
                    break;
                }
                Err(e) if attempt < SUBSCRIBE_ATTEMPTS => {
                    warn!("Subscribing to {} failed ({}), retrying", topic, e);
                    attempt += 1;
                    FreeRtos::delay_ms(500);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    let client = Rc::new(RefCell::new(client));

    Ok((
        ShadowLink {
            client: client.clone(),
            topic: config.shadow_topic.clone(),
        },
        MessageLink { client },
    ))
}
