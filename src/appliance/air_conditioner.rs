//! Air conditioner façade (§4.6): the product-specific layer the original
//! firmware builds as `AirConditioner : public ApplianceBase`. It owns
//! nothing the dispatcher already owns — it only knows how to turn a
//! [`Control`] into a `0x40` command, how to keep [`DeviceStatus`] current
//! from whatever the dispatcher hands it, and when to poll.
//!
//! Request callbacks handed to [`crate::dispatcher::Dispatcher`] are
//! `'static` closures and can't borrow `&mut self` back out of the
//! dispatcher's queue. Rather than thread the whole façade through them,
//! solicited replies get decoded inside the closure and pushed onto a
//! shared `inbox` (`Rc<RefCell<Vec<PendingAction>>>`); [`AirConditioner::loop_tick`]
//! drains it once `tick` returns, with an ordinary `&mut self` in hand to
//! merge state and enqueue any follow-up request. Unsolicited status
//! pushes don't need this detour: `on_unsolicited` is a plain (non-boxed)
//! closure built fresh each `loop_tick`, so it can capture the inbox the
//! same way.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dispatcher::{Config as DispatcherConfig, Dispatcher, Request, ResponseOutcome};
use crate::frame::{Frame, FrameType};
use crate::network::NetworkInfo;
use crate::payload::capability::{self, Capabilities, Modes, SwingCapability, TempRange};
use crate::payload::command::{self, CommandIntent};
use crate::payload::power;
use crate::payload::property::{self, PropertyRecord};
use crate::payload::status::{self, StatusUpdate};
use crate::payload::types::{FanSpeed, Mode, Preset, SwingMode};
use crate::transport::Transport;

/// A partial control request (§4.6): every field left `None` is left
/// untouched on the device's committed state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Control {
	pub power: Option<bool>,
	pub mode: Option<Mode>,
	pub target_temp: Option<f32>,
	pub fan: Option<FanSpeed>,
	pub swing: Option<SwingMode>,
	pub preset: Option<Preset>,
}

/// Committed device state as the façade last knew it (§3 Data Model).
/// Temperature/humidity fields stay `None` until the first status reply
/// or push supplies them — there is no sane zero value to default them to.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
	pub power: bool,
	pub mode: Mode,
	pub target_temp: f32,
	pub fan: FanSpeed,
	pub swing: SwingMode,
	pub preset: Preset,
	pub indoor_temp: Option<f32>,
	pub outdoor_temp: Option<f32>,
	pub humidity: Option<u8>,
	pub power_usage: Option<f64>,
	pub filter_full: Option<bool>,
	pub error_code: Option<u8>,
	pub timer_on_minutes: Option<u16>,
	pub timer_off_minutes: Option<u16>,
}

impl Default for DeviceStatus {
	fn default() -> Self {
		Self {
			power: false,
			mode: Mode::Off,
			target_temp: 24.0,
			fan: FanSpeed::Auto,
			swing: SwingMode::Off,
			preset: Preset::None,
			indoor_temp: None,
			outdoor_temp: None,
			humidity: None,
			power_usage: None,
			filter_full: None,
			error_code: None,
			timer_on_minutes: None,
			timer_off_minutes: None,
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct ApplianceConfig {
	pub dispatcher: DispatcherConfig,
	/// How often to poll `GET_POWER` (§4.6); the original keeps this on its
	/// own `Timer` member separate from the unconditional per-idle status
	/// poll `m_onIdle` runs.
	pub power_poll_ms: u64,
}

impl Default for ApplianceConfig {
	fn default() -> Self {
		Self { dispatcher: DispatcherConfig::default(), power_poll_ms: 60_000 }
	}
}

#[derive(Debug, Default)]
struct SharedState {
	status: DeviceStatus,
	capabilities: Capabilities,
}

/// Fully decoded data a solicited request's callback couldn't apply
/// directly (see module docs) — `loop_tick` applies these with `&mut self`
/// once `Dispatcher::tick` returns.
enum PendingAction {
	Status(StatusUpdate),
	Capabilities(Capabilities, u8),
	PropertyReply(Vec<PropertyRecord>),
	PowerUsage(f64),
}

/// The product-specific façade (§4.6). Mirrors `AirConditioner`'s public
/// surface: `control`/`set_power`/`toggle_power`/`display_toggle`/
/// `set_beeper`/`set_preset` to act, and one accessor per reported field.
pub struct AirConditioner {
	dispatcher: Dispatcher,
	shared: Rc<RefCell<SharedState>>,
	inbox: Rc<RefCell<Vec<PendingAction>>>,
	config: ApplianceConfig,
	beeper: bool,
	/// Most recently requested non-`Off` mode, restored by `set_power(true)`
	/// the way the original remembers the mode across a power cycle.
	last_mode: Mode,
	last_sent_intent: Option<CommandIntent>,
	last_power_poll_ms: Option<u64>,
}

impl AirConditioner {
	pub fn new(appliance_kind: u8, protocol_id: u8, config: ApplianceConfig, now_ms: u64) -> Self {
		Self {
			dispatcher: Dispatcher::new(appliance_kind, protocol_id, config.dispatcher, now_ms),
			shared: Rc::new(RefCell::new(SharedState::default())),
			inbox: Rc::new(RefCell::new(Vec::new())),
			config,
			beeper: false,
			last_mode: Mode::Auto,
			last_sent_intent: None,
			last_power_poll_ms: None,
		}
	}

	/// Enqueues the initial capability query (§4.6, mirrors `m_setup`).
	pub fn setup(&mut self) {
		self.dispatcher.enqueue(build_capability_request(self.inbox.clone(), None));
	}

	/// Advances the façade by one cooperative step: ticks the dispatcher,
	/// drains whatever solicited replies it collected, and — independently
	/// of the dispatcher's own idle/cooldown bookkeeping — enqueues a
	/// `GET_POWER` poll if its own interval has elapsed.
	pub fn loop_tick(&mut self, now_ms: u64, transport: &mut dyn Transport, network: &dyn NetworkInfo) {
		let due = match self.last_power_poll_ms {
			None => true,
			Some(t) => now_ms.saturating_sub(t) >= self.config.power_poll_ms,
		};
		if due {
			self.last_power_poll_ms = Some(now_ms);
			self.dispatcher.enqueue(build_power_request(self.inbox.clone()));
		}

		let inbox_unsolicited = self.inbox.clone();
		let inbox_idle = self.inbox.clone();
		self.dispatcher.tick(
			now_ms,
			transport,
			network,
			move |frame| stash_unsolicited_status(&inbox_unsolicited, frame),
			move |dispatcher| dispatcher.enqueue(build_status_request(inbox_idle.clone())),
		);

		let actions = std::mem::take(&mut *self.inbox.borrow_mut());
		for action in actions {
			self.apply_pending_action(action);
		}
	}

	fn apply_pending_action(&mut self, action: PendingAction) {
		match action {
			PendingAction::Status(update) => {
				let mut shared = self.shared.borrow_mut();
				apply_status_update(&mut shared.status, &update);
			}
			PendingAction::Capabilities(fresh, trailing) => {
				{
					let mut shared = self.shared.borrow_mut();
					merge_capabilities(&mut shared.capabilities, fresh);
				}
				if trailing != 0 {
					self.dispatcher.enqueue(build_capability_request(self.inbox.clone(), Some(trailing)));
				} else {
					let (needs_b1, uuids) = {
						let shared = self.shared.borrow();
						(shared.capabilities.needs_b1_query(), shared.capabilities.b1_query_uuids())
					};
					if needs_b1 {
						self.dispatcher.enqueue(build_property_request(self.inbox.clone(), uuids));
					}
				}
			}
			PendingAction::PropertyReply(records) => {
				log::trace!("received {} property record(s), not projected into device status", records.len());
			}
			PendingAction::PowerUsage(kwh) => {
				self.shared.borrow_mut().status.power_usage = Some(kwh);
			}
		}
	}

	/// Applies a partial control request (§4.6). `target_temp >= 50.0` is
	/// treated as Fahrenheit and converted back to Celsius before use, the
	/// way `DeviceStatus::DeviceStatus(const StatusData&)` does for any
	/// caller-supplied temperature in that range.
	pub fn control(&mut self, control: Control) {
		if let Some(mode) = control.mode {
			if mode != Mode::Off {
				self.last_mode = mode;
			}
		}

		let intent = {
			let mut shared = self.shared.borrow_mut();
			let status = &mut shared.status;

			if let Some(v) = control.fan {
				status.fan = v;
			}
			if let Some(v) = control.swing {
				status.swing = v;
			}
			if let Some(v) = control.preset {
				status.preset = v;
			}
			if let Some(v) = control.target_temp {
				status.target_temp = normalize_target_temp(v);
			}
			if let Some(v) = control.power {
				status.power = v;
			}

			let active_mode = control.mode.filter(|m| *m != Mode::Off).unwrap_or(self.last_mode);
			status.mode = if status.power { active_mode } else { Mode::Off };

			build_command_intent(status, self.beeper)
		};

		self.send_command(intent);
	}

	fn send_command(&mut self, intent: CommandIntent) {
		if self.last_sent_intent == Some(intent) {
			log::trace!("control would be a no-op, suppressing redundant frame");
			return;
		}
		self.last_sent_intent = Some(intent);

		let inbox = self.inbox.clone();
		let payload = command::encode(&intent);
		self.dispatcher.enqueue(Request::expecting(
			FrameType::Set,
			payload,
			is_status_reply,
			move |frame| match decode_status_payload(frame.payload()) {
				Ok(update) => inbox.borrow_mut().push(PendingAction::Status(update)),
				Err(err) => log::warn!("status payload malformed after control: {err}"),
			},
			|| log::warn!("control command timed out, device may not have applied it"),
		));
	}

	pub fn set_power(&mut self, on: bool) {
		self.control(Control { power: Some(on), ..Default::default() });
	}

	pub fn toggle_power(&mut self) {
		let on = !self.shared.borrow().status.power;
		self.set_power(on);
	}

	pub fn set_preset(&mut self, preset: Preset) {
		self.control(Control { preset: Some(preset), ..Default::default() });
	}

	/// One-shot display on/off toggle (§4.6): fire-and-forget, no status
	/// reply is expected.
	pub fn display_toggle(&mut self) {
		self.dispatcher.enqueue(Request::fire_and_forget(FrameType::Set, command::encode_display_toggle()));
	}

	/// Sets the beeper flag applied to every future `0x40` command; takes
	/// effect on the next `control` call, same as the original's
	/// `setBeeper`.
	pub fn set_beeper(&mut self, value: bool) {
		self.beeper = value;
	}

	pub fn power(&self) -> bool {
		self.shared.borrow().status.power
	}

	pub fn mode(&self) -> Mode {
		self.shared.borrow().status.mode
	}

	pub fn target_temp(&self) -> f32 {
		self.shared.borrow().status.target_temp
	}

	pub fn fan(&self) -> FanSpeed {
		self.shared.borrow().status.fan
	}

	pub fn swing(&self) -> SwingMode {
		self.shared.borrow().status.swing
	}

	pub fn preset(&self) -> Preset {
		self.shared.borrow().status.preset
	}

	pub fn indoor_temp(&self) -> Option<f32> {
		self.shared.borrow().status.indoor_temp
	}

	pub fn outdoor_temp(&self) -> Option<f32> {
		self.shared.borrow().status.outdoor_temp
	}

	pub fn humidity(&self) -> Option<u8> {
		self.shared.borrow().status.humidity
	}

	pub fn power_usage(&self) -> Option<f64> {
		self.shared.borrow().status.power_usage
	}

	pub fn status(&self) -> DeviceStatus {
		self.shared.borrow().status.clone()
	}

	pub fn capabilities(&self) -> Capabilities {
		self.shared.borrow().capabilities.clone()
	}

	#[cfg(test)]
	fn dispatcher(&self) -> &Dispatcher {
		&self.dispatcher
	}
}

/// `>= 50` means the caller handed us a Fahrenheit value (§4.6): converted
/// back to Celsius at this boundary, matching
/// `DeviceStatus::fahrenheits_to_celsius`. Internal storage is always
/// Celsius; `temp_unit_fahrenheit` is a device display preference the
/// façade never needs to consult here.
fn normalize_target_temp(value: f32) -> f32 {
	if value >= 50.0 {
		(value - 32.0) / 1.8
	} else {
		value
	}
}

fn build_command_intent(status: &DeviceStatus, beeper: bool) -> CommandIntent {
	CommandIntent {
		power: status.power,
		mode: status.mode,
		target_temp: status.target_temp,
		fan: status.fan,
		swing: status.swing,
		eco: status.preset == Preset::Eco,
		turbo: status.preset == Preset::Turbo,
		sleep: status.preset == Preset::Sleep,
		freeze_protection: status.preset == Preset::FreezeProtection,
		beeper,
		temp_unit_fahrenheit: false,
		humidity: 0,
	}
}

/// Merges a decoded status slice into committed state (§7 `PayloadMalformed`
/// policy, lifted here since every decoder returns `Option`-wrapped fields
/// for exactly this reason). `preset` is deliberately untouched: it is
/// façade-owned user intent, not something the device's eco/turbo/sleep
/// bits get to overwrite (the original's `DeviceStatus` struct at the
/// protocol layer keeps those as independent booleans with no unifying
/// enum; only `AirConditioner::m_preset` exists, and only `control` sets it).
fn apply_status_update(status: &mut DeviceStatus, update: &StatusUpdate) {
	if let Some(v) = update.power {
		status.power = v;
	}
	if let Some(v) = update.mode {
		status.mode = if status.power { v } else { Mode::Off };
	}
	if let Some(v) = update.target_temp {
		status.target_temp = v;
	}
	if let Some(v) = update.fan {
		status.fan = v;
	}
	if let Some(v) = update.swing {
		status.swing = v;
	}
	if let Some(v) = update.timer_on_minutes {
		status.timer_on_minutes = Some(v);
	}
	if let Some(v) = update.timer_off_minutes {
		status.timer_off_minutes = Some(v);
	}
	if update.indoor_temp.is_some() {
		status.indoor_temp = update.indoor_temp;
	}
	if update.outdoor_temp.is_some() {
		status.outdoor_temp = update.outdoor_temp;
	}
	if update.humidity.is_some() {
		status.humidity = update.humidity;
	}
	if let Some(v) = update.filter_full {
		status.filter_full = Some(v);
	}
	if let Some(v) = update.error_code {
		status.error_code = Some(v);
	}
}

/// Accumulates capability pages (§4.3.5, §8 scenario S4). `Capabilities`
/// has no `Option`-wrapped fields to make "only what this page reported"
/// unambiguous, so later pages win on booleans via OR (a feature seen once
/// stays seen) and override non-default compound/int fields outright.
fn merge_capabilities(acc: &mut Capabilities, fresh: Capabilities) {
	acc.vertical_wind |= fresh.vertical_wind;
	acc.horizontal_wind |= fresh.horizontal_wind;
	acc.humidity_auto |= fresh.humidity_auto;
	acc.humidity_hand |= fresh.humidity_hand;
	acc.silky |= fresh.silky;
	acc.smart_eye |= fresh.smart_eye;
	acc.blowing_people |= fresh.blowing_people;
	acc.avoid_people |= fresh.avoid_people;
	acc.self_clean |= fresh.self_clean;
	acc.one_key_no_wind |= fresh.one_key_no_wind;
	acc.breeze |= fresh.breeze;
	acc.no_wind_speed |= fresh.no_wind_speed;
	acc.eco |= fresh.eco;
	acc.special_eco |= fresh.special_eco;
	acc.eight_hot |= fresh.eight_hot;
	acc.power_cal |= fresh.power_cal;
	acc.power_cal_setting |= fresh.power_cal_setting;
	acc.power_cal_bcd |= fresh.power_cal_bcd;
	acc.nest_check |= fresh.nest_check;
	acc.nest_need_change |= fresh.nest_need_change;
	acc.dianfure |= fresh.dianfure;
	acc.strong_hot |= fresh.strong_hot;
	acc.strong_cool |= fresh.strong_cool;
	acc.unit_changeable |= fresh.unit_changeable;
	acc.is_have_point |= fresh.is_have_point;
	acc.buzzer |= fresh.buzzer;
	acc.is_twins |= fresh.is_twins;
	acc.is_four_direction |= fresh.is_four_direction;

	if fresh.has_wind_speed != 0 {
		acc.has_wind_speed = fresh.has_wind_speed;
	}
	if fresh.light_type != 0 {
		acc.light_type = fresh.light_type;
	}
	if fresh.modes != Modes::default() {
		acc.modes = fresh.modes;
	}
	if fresh.swing != SwingCapability::default() {
		acc.swing = fresh.swing;
	}
	if fresh.temp_cool != TempRange::default() {
		acc.temp_cool = fresh.temp_cool;
	}
	if fresh.temp_auto != TempRange::default() {
		acc.temp_auto = fresh.temp_auto;
	}
	if fresh.temp_heat != TempRange::default() {
		acc.temp_heat = fresh.temp_heat;
	}
}

fn decode_status_payload(payload: &[u8]) -> crate::payload::error::Result<StatusUpdate> {
	match payload.first().copied() {
		Some(status::ID_STATUS_C0) => status::decode_c0(payload),
		Some(status::ID_STATUS_A0) => status::decode_a0(payload),
		Some(status::ID_AMBIENT_A1) => status::decode_a1(payload),
		other => Err(crate::payload::error::PayloadError::UnexpectedId(other.unwrap_or(0))),
	}
}

fn stash_unsolicited_status(inbox: &Rc<RefCell<Vec<PendingAction>>>, frame: &Frame) {
	match decode_status_payload(frame.payload()) {
		Ok(update) => inbox.borrow_mut().push(PendingAction::Status(update)),
		Err(err) => log::trace!("ignoring unsolicited non-status frame: {err}"),
	}
}

fn is_status_reply(frame: &Frame) -> ResponseOutcome {
	let id = frame.payload().first().copied();
	let matches_status_id = matches!(id, Some(status::ID_STATUS_C0) | Some(status::ID_STATUS_A0));
	if frame.has_type(FrameType::Reply) && matches_status_id {
		ResponseOutcome::Ok
	} else {
		ResponseOutcome::Wrong
	}
}

/// The original's `Request::callHandler` gates `onData` on
/// `frame.hasType(requestType)` before ever invoking it; here that check
/// is folded into each request's own `on_data` closure instead of being an
/// automatic property of the dispatcher (§9 Design Notes: the dispatcher
/// treats `on_data` purely as "classify this frame", with no notion of
/// "the type it was sent as"). `is_status_reply` above and the two
/// closures below are where that classification actually happens.
fn build_capability_request(inbox: Rc<RefCell<Vec<PendingAction>>>, followup_id: Option<u8>) -> Request {
	let payload = capability::build_query(followup_id);
	Request::expecting(
		FrameType::Query,
		payload,
		|frame: &Frame| {
			if frame.has_type(FrameType::Reply) && frame.payload().first() == Some(&capability::ID_CAPABILITIES) {
				ResponseOutcome::Ok
			} else {
				ResponseOutcome::Wrong
			}
		},
		move |frame: &Frame| {
			let body = &frame.payload()[1..];
			match capability::decode(body) {
				Ok((caps, trailing)) => inbox.borrow_mut().push(PendingAction::Capabilities(caps, trailing)),
				Err(err) => log::warn!("capability payload malformed: {err}"),
			}
		},
		|| log::warn!("capability query timed out"),
	)
}

fn build_status_request(inbox: Rc<RefCell<Vec<PendingAction>>>) -> Request {
	Request::expecting(
		FrameType::Query,
		command::encode_get_status(),
		is_status_reply,
		move |frame: &Frame| match decode_status_payload(frame.payload()) {
			Ok(update) => inbox.borrow_mut().push(PendingAction::Status(update)),
			Err(err) => log::debug!("status payload malformed: {err}"),
		},
		|| log::debug!("status poll timed out"),
	)
}

fn build_power_request(inbox: Rc<RefCell<Vec<PendingAction>>>) -> Request {
	Request::expecting(
		FrameType::Query,
		vec![power::ID_POWER],
		|frame: &Frame| {
			if frame.has_type(FrameType::Reply) && frame.payload().first() == Some(&power::ID_POWER) {
				ResponseOutcome::Ok
			} else {
				ResponseOutcome::Wrong
			}
		},
		move |frame: &Frame| match power::decode(frame.payload()) {
			Ok(kwh) => inbox.borrow_mut().push(PendingAction::PowerUsage(kwh)),
			Err(err) => log::debug!("power payload malformed: {err}"),
		},
		|| log::debug!("power poll timed out"),
	)
}

fn build_property_request(inbox: Rc<RefCell<Vec<PendingAction>>>, uuids: Vec<u16>) -> Request {
	let payload = property::build_query(&uuids);
	Request::expecting(
		FrameType::Query,
		payload,
		|frame: &Frame| {
			if frame.has_type(FrameType::Reply) && frame.payload().first() == Some(&property::ID_PROPERTY) {
				ResponseOutcome::Ok
			} else {
				ResponseOutcome::Wrong
			}
		},
		move |frame: &Frame| match property::parse_reply(frame.payload()) {
			Ok(records) => inbox.borrow_mut().push(PendingAction::PropertyReply(records)),
			Err(err) => log::debug!("property payload malformed: {err}"),
		},
		|| log::debug!("property query timed out"),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::frame::{self as frame_mod, Deserializer};
	use crate::network::FakeNetworkInfo;
	use crate::transport::FakeTransport;

	fn new_ac(now_ms: u64) -> AirConditioner {
		AirConditioner::new(0xAC, 0x00, ApplianceConfig::default(), now_ms)
	}

	fn first_frame(bytes: &[u8]) -> Option<crate::frame::Frame> {
		let mut d = Deserializer::new();
		bytes.iter().find_map(|b| d.push(*b))
	}

	#[test]
	fn setup_enqueues_capability_query() {
		let mut ac = new_ac(0);
		ac.setup();
		assert_eq!(ac.dispatcher().queue_len(), 1);
	}

	#[test]
	fn control_cool_22_5_transmits_set_frame() {
		let mut ac = new_ac(0);
		ac.control(Control { power: Some(true), mode: Some(Mode::Cool), target_temp: Some(22.5), ..Default::default() });

		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();
		ac.loop_tick(0, &mut transport, &network);

		let sent = transport.take_outbound();
		let frame = first_frame(&sent).expect("a frame was sent");
		assert_eq!(frame.frame_type(), FrameType::Set);
		assert_eq!(frame.payload()[0], command::ID_COMMAND);
	}

	#[test]
	fn redundant_control_is_suppressed() {
		let mut ac = new_ac(0);
		let control = Control { power: Some(true), mode: Some(Mode::Cool), target_temp: Some(22.0), ..Default::default() };
		ac.control(control);
		ac.control(control);
		assert_eq!(ac.dispatcher().queue_len(), 1);
	}

	#[test]
	fn set_power_off_then_on_restores_last_mode() {
		let mut ac = new_ac(0);
		ac.control(Control { power: Some(true), mode: Some(Mode::Heat), ..Default::default() });
		assert_eq!(ac.mode(), Mode::Heat);

		ac.set_power(false);
		assert_eq!(ac.mode(), Mode::Off);
		assert!(!ac.power());

		ac.set_power(true);
		assert_eq!(ac.mode(), Mode::Heat);
	}

	#[test]
	fn toggle_power_flips_current_state() {
		let mut ac = new_ac(0);
		assert!(!ac.power());
		ac.toggle_power();
		assert!(ac.power());
		ac.toggle_power();
		assert!(!ac.power());
	}

	#[test]
	fn set_preset_is_mutually_exclusive() {
		let mut ac = new_ac(0);
		ac.set_preset(Preset::Turbo);
		assert_eq!(ac.preset(), Preset::Turbo);
		ac.set_preset(Preset::Eco);
		assert_eq!(ac.preset(), Preset::Eco);
	}

	#[test]
	fn control_boundary_converts_fahrenheit_target() {
		let mut ac = new_ac(0);
		// 71.6F == 22.0C
		ac.control(Control { power: Some(true), target_temp: Some(71.6), ..Default::default() });
		assert!((ac.target_temp() - 22.0).abs() < 0.05);
	}

	#[test]
	fn idle_tick_eventually_polls_status() {
		let mut ac = new_ac(0);
		ac.config.power_poll_ms = 60_000;
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();

		ac.loop_tick(0, &mut transport, &network); // sends the initial power poll
		let sent = transport.take_outbound();
		assert_eq!(first_frame(&sent).unwrap().payload().first(), Some(&power::ID_POWER));

		let reply = frame_mod::serialize(0xAC, 0x00, FrameType::Reply, &[power::ID_POWER, 0, 0, 0, 0, 0]);
		transport.inject(&reply);
		ac.loop_tick(1000, &mut transport, &network); // frees the slot, queue empty -> on_idle queues GET_STATUS
		assert!(transport.take_outbound().is_empty(), "on_idle only enqueues, it doesn't transmit this tick");

		ac.loop_tick(1001, &mut transport, &network); // transmits the queued GET_STATUS
		let sent = transport.take_outbound();
		let frame = first_frame(&sent).expect("idle tick should poll status");
		assert_eq!(frame.payload().first(), Some(&command::ID_QUERY_STATUS));
	}

	#[test]
	fn status_reply_merges_into_accessors() {
		let mut ac = new_ac(0);
		ac.config.power_poll_ms = 60_000;
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();

		// The very first tick always polls power first (mirrors the
		// unconditional `m_onIdle` poll it stands in for); work through that
		// before a GET_STATUS request ever reaches the wire.
		ac.loop_tick(0, &mut transport, &network);
		transport.take_outbound();
		let power_reply = frame_mod::serialize(0xAC, 0x00, FrameType::Reply, &[power::ID_POWER, 0, 0, 0, 0, 0]);
		transport.inject(&power_reply);
		ac.loop_tick(1000, &mut transport, &network); // frees the slot, on_idle queues GET_STATUS
		ac.loop_tick(1001, &mut transport, &network); // transmits it
		transport.take_outbound();

		let mut body = vec![0u8; 20];
		body[0] = status::ID_STATUS_C0;
		body[1] = 0b1000_0001; // power on
		body[2] = (2 << 5) | (24 - 16); // cool, 24C
		body[3] = FanSpeed::AUTO;
		let reply = frame_mod::serialize(0xAC, 0x00, FrameType::Reply, &body);
		transport.inject(&reply);

		ac.loop_tick(2000, &mut transport, &network);
		assert!(ac.power());
		assert_eq!(ac.mode(), Mode::Cool);
		assert_eq!(ac.target_temp(), 24.0);
	}

	#[test]
	fn unsolicited_notify_updates_status_without_a_request() {
		let mut ac = new_ac(0);
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();

		let mut body = vec![0u8; 18];
		body[0] = status::ID_AMBIENT_A1;
		body[13] = 90; // indoor 20.0C
		body[14] = 70; // outdoor 10.0C
		let push = frame_mod::serialize(0xAC, 0x00, FrameType::Notify, &body);
		transport.inject(&push);

		ac.loop_tick(0, &mut transport, &network);
		assert_eq!(ac.indoor_temp(), Some(20.0));
		assert_eq!(ac.outdoor_temp(), Some(10.0));
	}

	#[test]
	fn capability_reply_with_followup_chains_a_second_query() {
		let mut ac = new_ac(0);
		ac.setup();
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();
		ac.loop_tick(0, &mut transport, &network);
		transport.take_outbound();

		// silky-cool (feature 0x0018) + trailing follow-up id 0x02.
		let mut body = vec![0xB5u8];
		body.extend_from_slice(&0x0018u16.to_le_bytes());
		body.push(1);
		body.push(1);
		body.push(0x02); // trailing follow-up id
		let reply = frame_mod::serialize(0xAC, 0x00, FrameType::Reply, &body);
		transport.inject(&reply);

		ac.loop_tick(1000, &mut transport, &network);
		assert!(ac.capabilities().silky);
		assert_eq!(ac.dispatcher().queue_len(), 1, "a chained capability query should be queued");
	}

	#[test]
	fn capability_reply_needing_b1_enqueues_property_query() {
		let mut ac = new_ac(0);
		ac.setup();
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();
		ac.loop_tick(0, &mut transport, &network);
		transport.take_outbound();

		let mut body = vec![0xB5u8];
		body.extend_from_slice(&0x0039u16.to_le_bytes()); // self_clean
		body.push(1);
		body.push(1);
		body.push(0); // no more capability pages
		let reply = frame_mod::serialize(0xAC, 0x00, FrameType::Reply, &body);
		transport.inject(&reply);

		ac.loop_tick(1000, &mut transport, &network);
		assert!(ac.capabilities().self_clean);
		assert_eq!(ac.dispatcher().queue_len(), 1, "a B1 property query should be queued");
	}

	#[test]
	fn power_poll_fires_once_within_interval() {
		let mut ac = new_ac(0);
		ac.config.power_poll_ms = 10_000;
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();

		ac.loop_tick(0, &mut transport, &network);
		let first = first_frame(&transport.take_outbound());
		assert_eq!(first.unwrap().payload().first(), Some(&power::ID_POWER));

		ac.loop_tick(500, &mut transport, &network);
		assert!(transport.take_outbound().is_empty(), "no second power poll should fire before the interval elapses");
	}

	#[test]
	fn display_toggle_is_fire_and_forget() {
		let mut ac = new_ac(0);
		ac.display_toggle();
		let mut transport = FakeTransport::new();
		let network = FakeNetworkInfo::default();
		ac.loop_tick(0, &mut transport, &network);
		assert!(!ac.dispatcher().is_waiting());
	}
}
