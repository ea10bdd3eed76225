//! HTTP transport for channel updates
//!
//! Posts the form-encoded update body over plain HTTP with reqwless on top
//! of the embassy-net stack.

use embassy_net::Stack;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use irrigo_core::config::{ChannelConfig, TELEMETRY_URL};
use irrigo_core::telemetry::{TelemetryError, TelemetryTransport};
use log::{debug, warn};
use reqwless::client::HttpClient;
use reqwless::request::{Method, RequestBuilder};
use static_cell::StaticCell;

const TCP_BUFFER_SIZE: usize = 1024;
const RX_BUFFER_SIZE: usize = 1024;

type ClientState = TcpClientState<1, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>;

pub struct HttpTransport {
    tcp: TcpClient<'static, 1, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>,
    dns: DnsSocket<'static>,
    rx_buffer: [u8; RX_BUFFER_SIZE],
}

impl HttpTransport {
    /// Create the transport. Can only be called once.
    pub fn new(stack: Stack<'static>) -> Self {
        static STATE: StaticCell<ClientState> = StaticCell::new();
        let state = STATE.init(TcpClientState::new());

        Self {
            tcp: TcpClient::new(stack, state),
            dns: DnsSocket::new(stack),
            rx_buffer: [0; RX_BUFFER_SIZE],
        }
    }
}

impl TelemetryTransport for HttpTransport {
    async fn submit(
        &mut self,
        channel: &ChannelConfig<'_>,
        body: &str,
    ) -> Result<u16, TelemetryError> {
        let mut client = HttpClient::new(&self.tcp, &self.dns);

        debug!("POST {} (channel {}, {} bytes)", TELEMETRY_URL, channel.id, body.len());

        let request = client
            .request(Method::POST, TELEMETRY_URL)
            .await
            .map_err(|e| {
                warn!("HTTP connect failed: {:?}", e);
                TelemetryError::Transport {
                    operation: "connect",
                    details: "could not open connection to channel host",
                }
            })?;

        let response = request
            .body(body.as_bytes())
            .headers(&[("Content-Type", "application/x-www-form-urlencoded")])
            .send(&mut self.rx_buffer)
            .await
            .map_err(|e| {
                warn!("HTTP POST failed: {:?}", e);
                TelemetryError::Transport {
                    operation: "POST",
                    details: "request or response failed",
                }
            })?;

        Ok(response.status.0)
    }
}
