use hwlink_frame::{kind_name, FrameConfig, Message, PacketReader, PacketWriter};
use hwlink_transport::{Connector, Transport};
use tracing::{debug, warn};

use crate::error::Result;

/// One open device handle carrying exactly one request/response pair.
///
/// [`request`](Self::request) consumes the session, so a second round trip
/// always goes through a freshly opened handle. Dropping an unused session
/// closes its handle.
pub struct DeviceSession<T: Transport> {
    transport: T,
    frame: FrameConfig,
    closed: bool,
}

impl<T: Transport> DeviceSession<T> {
    /// Open a handle through `connector`.
    pub fn open<C>(connector: &C, frame: FrameConfig) -> Result<Self>
    where
        C: Connector<Transport = T> + ?Sized,
    {
        let transport = connector.open()?;
        debug!(transport = transport.transport_name(), "device session opened");
        Ok(Self::from_transport(transport, frame))
    }

    /// Wrap an already-open transport.
    pub fn from_transport(transport: T, frame: FrameConfig) -> Self {
        Self {
            transport,
            frame,
            closed: false,
        }
    }

    /// Send one request, wait for the response, and close the handle.
    pub fn request(mut self, request: &Message) -> Result<Message> {
        let result = self.exchange(request);
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "failed to close device session");
        }
        result
    }

    fn exchange(&mut self, request: &Message) -> Result<Message> {
        let packets = PacketWriter::with_config(&mut self.transport, self.frame.clone())
            .write_message(request)?;
        let response =
            PacketReader::with_config(&mut self.transport, self.frame.clone()).read_message()?;

        debug!(
            request = kind_name(request.kind),
            packets,
            response = kind_name(response.kind),
            response_len = response.payload.len(),
            "round trip complete"
        );
        Ok(response)
    }

    /// Close the handle without sending anything.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.transport.close()?;
        Ok(())
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl<T: Transport> std::fmt::Debug for DeviceSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("transport", &self.transport.transport_name())
            .field("closed", &self.closed)
            .finish()
    }
}
