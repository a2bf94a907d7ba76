//! Request queue and retry/cooldown state machine (§4.5).
//!
//! The dispatcher is the reusable engine the original firmware modelled as
//! a virtual base class with a concrete-appliance subtype; here that seam
//! is a capability set of plain closures (`on_data`/`on_success`/
//! `on_error` per request, `on_unsolicited`/`on_idle` for the dispatcher
//! as a whole) rather than inheritance (§9 Design Notes). Request
//! ownership is linear — `enqueue` moves a [`Request`] in, and it is
//! dropped (after `on_success` or `on_error` runs) rather than shared.
//!
//! `IDLE`/`WAITING` are modelled directly; `SENT_NO_RESP` collapses into
//! `IDLE` with the cooldown clock still running, since nothing observable
//! distinguishes them — both just mean "busy, no response expected" from
//! the next tick's point of view.

use std::collections::VecDeque;

use crate::frame::{self, Deserializer, Frame, FrameType};
use crate::network::NetworkInfo;
use crate::payload::network::NetworkNotify;
use crate::transport::Transport;

/// What a request's `on_data` handler makes of an incoming frame (§7).
pub enum ResponseOutcome {
	Ok,
	Retry,
	Wrong,
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
	pub period_ms: u64,
	pub timeout_ms: u64,
	pub attempts: u8,
	pub heartbeat_ms: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self { period_ms: 1000, timeout_ms: 2000, attempts: 3, heartbeat_ms: 120_000 }
	}
}

/// A queued or in-flight outbound frame plus its callback triple (§3, §9
/// Design Notes). `on_data = None` makes this fire-and-forget — it is
/// transmitted once and never awaits a response.
pub struct Request {
	frame_type: FrameType,
	payload: Vec<u8>,
	on_data: Option<Box<dyn FnMut(&Frame) -> ResponseOutcome>>,
	on_success: Option<Box<dyn FnOnce(&Frame)>>,
	on_error: Option<Box<dyn FnOnce()>>,
}

impl Request {
	pub fn fire_and_forget(frame_type: FrameType, payload: Vec<u8>) -> Self {
		Self { frame_type, payload, on_data: None, on_success: None, on_error: None }
	}

	pub fn expecting(
		frame_type: FrameType,
		payload: Vec<u8>,
		on_data: impl FnMut(&Frame) -> ResponseOutcome + 'static,
		on_success: impl FnOnce(&Frame) + 'static,
		on_error: impl FnOnce() + 'static,
	) -> Self {
		Self {
			frame_type,
			payload,
			on_data: Some(Box::new(on_data)),
			on_success: Some(Box::new(on_success)),
			on_error: Some(Box::new(on_error)),
		}
	}
}

struct InFlight {
	request: Request,
	remaining_attempts: u8,
	deadline_ms: u64,
}

/// Component E: owns the queue and the single in-flight request
/// exclusively (§3 Ownership).
pub struct Dispatcher {
	appliance_kind: u8,
	protocol_id: u8,
	config: Config,
	queue: VecDeque<Request>,
	in_flight: Option<InFlight>,
	deserializer: Deserializer,
	last_transmit_ms: Option<u64>,
	next_heartbeat_ms: u64,
}

impl Dispatcher {
	pub fn new(appliance_kind: u8, protocol_id: u8, config: Config, now_ms: u64) -> Self {
		Self {
			appliance_kind,
			protocol_id,
			config,
			queue: VecDeque::new(),
			in_flight: None,
			deserializer: Deserializer::new(),
			last_transmit_ms: None,
			next_heartbeat_ms: now_ms + config.heartbeat_ms,
		}
	}

	pub fn enqueue(&mut self, request: Request) {
		self.queue.push_back(request);
	}

	/// Inserts at the front of the queue, for the `0x63` bypass path and
	/// anything else that needs to jump ahead of already-queued work.
	pub fn enqueue_priority(&mut self, request: Request) {
		self.queue.push_front(request);
	}

	pub fn is_waiting(&self) -> bool {
		self.in_flight.is_some()
	}

	pub fn queue_len(&self) -> usize {
		self.queue.len()
	}

	fn is_busy(&self, now_ms: u64) -> bool {
		self.last_transmit_ms.is_some_and(|t| now_ms.saturating_sub(t) < self.config.period_ms)
	}

	fn transmit(&mut self, transport: &mut dyn Transport, now_ms: u64, frame_type: FrameType, payload: &[u8]) {
		let bytes = frame::serialize(self.appliance_kind, self.protocol_id, frame_type, payload);
		transport.write(&bytes);
		self.last_transmit_ms = Some(now_ms);
	}

	fn network_notify_payload(network: &dyn NetworkInfo) -> Vec<u8> {
		NetworkNotify { connected: network.is_connected(), signal_bars: network.signal_bars(), ipv4: network.local_ipv4() }
			.encode()
	}

	/// Advances the dispatcher by one cooperative step (§5): drains
	/// whatever bytes `transport` has available, processes any completed
	/// frames, handles a timed-out in-flight request, fires the heartbeat
	/// if due, and — if idle — either dequeues the next request or
	/// invokes `on_idle`.
	pub fn tick(
		&mut self,
		now_ms: u64,
		transport: &mut dyn Transport,
		network: &dyn NetworkInfo,
		mut on_unsolicited: impl FnMut(&Frame),
		mut on_idle: impl FnMut(&mut Self),
	) {
		while let Some(byte) = transport.read() {
			if let Some(frame) = self.deserializer.push(byte) {
				self.handle_frame(now_ms, network, frame, &mut on_unsolicited);
			}
		}

		self.handle_timeout(now_ms, transport);

		if now_ms >= self.next_heartbeat_ms {
			self.next_heartbeat_ms = now_ms + self.config.heartbeat_ms;
			let payload = Self::network_notify_payload(network);
			self.enqueue(Request::fire_and_forget(FrameType::NetworkNotify, payload));
		}

		if self.is_busy(now_ms) {
			return;
		}

		// A fire-and-forget request at the front (e.g. the `0x63` bypass
		// reply) can transmit even while a response-expecting request is
		// still in flight — it never occupies the single "awaiting
		// response" slot invariant 6 is about. A response-expecting
		// request at the front has to wait for that slot to free up.
		let can_send_front = match self.queue.front() {
			Some(front) => front.on_data.is_none() || !self.is_waiting(),
			None => false,
		};

		if can_send_front {
			let request = self.queue.pop_front().unwrap();
			self.transmit(transport, now_ms, request.frame_type, &request.payload);
			if request.on_data.is_some() {
				self.in_flight = Some(InFlight {
					deadline_ms: now_ms + self.config.timeout_ms,
					remaining_attempts: self.config.attempts.saturating_sub(1),
					request,
				});
			}
		} else if self.queue.is_empty() && !self.is_waiting() {
			on_idle(self);
		}
	}

	fn handle_frame(
		&mut self,
		now_ms: u64,
		network: &dyn NetworkInfo,
		frame: Frame,
		on_unsolicited: &mut impl FnMut(&Frame),
	) {
		if let Some(in_flight) = &mut self.in_flight {
			let outcome = match &mut in_flight.request.on_data {
				Some(handler) => handler(&frame),
				None => ResponseOutcome::Wrong,
			};
			match outcome {
				ResponseOutcome::Ok => {
					let in_flight = self.in_flight.take().unwrap();
					if let Some(on_success) = in_flight.request.on_success {
						on_success(&frame);
					}
					return;
				}
				ResponseOutcome::Retry => {
					in_flight.deadline_ms = now_ms + self.config.timeout_ms;
					return;
				}
				ResponseOutcome::Wrong => {}
			}
		}
		self.handle_unsolicited(network, frame, on_unsolicited);
	}

	fn handle_unsolicited(&mut self, network: &dyn NetworkInfo, frame: Frame, on_unsolicited: &mut impl FnMut(&Frame)) {
		match frame.frame_type() {
			FrameType::NetworkNotify => {
				log::trace!("ignoring unsolicited network-notify push");
			}
			FrameType::QueryNetwork => {
				log::debug!("answering network query, respecting cooldown");
				let payload = Self::network_notify_payload(network);
				self.enqueue_priority(Request::fire_and_forget(FrameType::NetworkNotify, payload));
			}
			_ => on_unsolicited(&frame),
		}
	}

	fn handle_timeout(&mut self, now_ms: u64, transport: &mut dyn Transport) {
		let Some(in_flight) = &self.in_flight else { return };
		if now_ms < in_flight.deadline_ms {
			return;
		}
		if in_flight.remaining_attempts > 0 {
			let in_flight = self.in_flight.as_mut().unwrap();
			in_flight.remaining_attempts -= 1;
			let payload = in_flight.request.payload.clone();
			let frame_type = in_flight.request.frame_type;
			self.transmit(transport, now_ms, frame_type, &payload);
			let in_flight = self.in_flight.as_mut().unwrap();
			in_flight.deadline_ms = now_ms + self.config.timeout_ms;
		} else {
			let in_flight = self.in_flight.take().unwrap();
			if let Some(on_error) = in_flight.request.on_error {
				on_error();
			}
		}
	}
}
