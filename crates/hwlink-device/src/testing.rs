//! Scripted in-memory device for state-machine tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hwlink_frame::{encode_message, Message, MessageDecoder};
use hwlink_transport::{Connector, Packet, Transport, TransportError};

use crate::messages::DeviceMessage;

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Message>,
    requests: Vec<Message>,
    opened: usize,
    closed: usize,
}

/// Connector whose device answers each complete request with the next
/// queued reply. Requests arriving after the queue is empty get no answer,
/// so the session read times out.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedConnector {
    script: Rc<RefCell<Script>>,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub(crate) fn reply<M: DeviceMessage>(self, message: M) -> Self {
        self.reply_raw(message.to_message())
    }

    pub(crate) fn reply_raw(self, message: Message) -> Self {
        self.script.borrow_mut().replies.push_back(message);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Message> {
        self.script.borrow().requests.clone()
    }

    pub(crate) fn request_kinds(&self) -> Vec<u16> {
        self.script.borrow().requests.iter().map(|m| m.kind).collect()
    }

    pub(crate) fn replies_left(&self) -> usize {
        self.script.borrow().replies.len()
    }

    /// `(opened, closed)` handle counts.
    pub(crate) fn handles(&self) -> (usize, usize) {
        let script = self.script.borrow();
        (script.opened, script.closed)
    }
}

impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    fn open(&self) -> hwlink_transport::Result<ScriptedTransport> {
        self.script.borrow_mut().opened += 1;
        Ok(ScriptedTransport {
            script: Rc::clone(&self.script),
            decoder: MessageDecoder::default(),
            inbound: VecDeque::new(),
            closed: false,
        })
    }
}

pub(crate) struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
    decoder: MessageDecoder,
    inbound: VecDeque<Packet>,
    closed: bool,
}

fn invalid(err: impl std::fmt::Display) -> TransportError {
    TransportError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        err.to_string(),
    ))
}

impl Transport for ScriptedTransport {
    fn read_packet(&mut self) -> hwlink_transport::Result<Packet> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.inbound.pop_front().ok_or(TransportError::Timeout)
    }

    fn write_packet(&mut self, packet: &Packet) -> hwlink_transport::Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let Some(request) = self.decoder.feed(packet).map_err(invalid)? else {
            return Ok(());
        };

        let mut script = self.script.borrow_mut();
        script.requests.push(request);
        if let Some(reply) = script.replies.pop_front() {
            let packets = encode_message(reply.kind, &reply.payload).map_err(invalid)?;
            self.inbound.extend(packets);
        }
        Ok(())
    }

    fn close(&mut self) -> hwlink_transport::Result<()> {
        if !self.closed {
            self.closed = true;
            self.script.borrow_mut().closed += 1;
        }
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}
