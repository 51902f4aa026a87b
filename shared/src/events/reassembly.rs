use std::{collections::HashMap, sync::Arc, time::Duration};

use log::{debug, trace, warn};
use parking_lot::Mutex;

use cinder_serde::BitReader;

use crate::{
    events::{
        receive_event::ReceiveEvent,
        send_event::{fragment_of, SendEvent},
    },
    ApplicationEvent, EventDispatch, EventId, EventPacket, EventReassemblySink, EventTarget,
    Instant, PeerId, ReassemblyConfig, ReassemblyError,
};

struct Target {
    max_pending_events: Option<u8>,
    /// Remaining number of incomplete inbound events this peer may open.
    /// `None` is unlimited.
    pending_budget: Option<u8>,
}

impl Target {
    /// Returns a slot to the budget, never above the limit.
    fn release_pending(&mut self) {
        if let (Some(budget), Some(limit)) = (self.pending_budget, self.max_pending_events) {
            self.pending_budget = Some(budget.saturating_add(1).min(limit));
        }
    }
}

#[derive(Default)]
struct ReassemblyState {
    send_list: HashMap<EventId, SendEvent>,
    receive_list: HashMap<PeerId, HashMap<EventId, ReceiveEvent>>,
    targets: HashMap<PeerId, Target>,
    next_event_id: EventId,
    last_tick: Option<Instant>,
}

type Outgoing = Vec<(PeerId, Vec<u8>)>;

/// Reliable delivery of named application events over an unreliable datagram
/// transport.
///
/// Outbound events are split into fragments which are paced per target at the
/// event's bytes-per-second rate and resent round-robin until acknowledged.
/// Inbound fragments are acknowledged individually, reassembled, and the
/// resulting event is handed to the [`EventDispatch`] with a `net:<peer>`
/// source.
///
/// All mutable state sits behind one lock, so `handle_packet` and
/// `network_tick` may be called from different threads. Packets and
/// dispatches are delivered after the lock is released.
pub struct EventReassembly {
    config: ReassemblyConfig,
    sink: Arc<dyn EventReassemblySink>,
    dispatch: Arc<dyn EventDispatch>,
    state: Mutex<ReassemblyState>,
}

impl EventReassembly {
    pub fn new(
        config: ReassemblyConfig,
        sink: Arc<dyn EventReassemblySink>,
        dispatch: Arc<dyn EventDispatch>,
    ) -> Self {
        Self {
            config,
            sink,
            dispatch,
            state: Mutex::new(ReassemblyState::default()),
        }
    }

    pub fn config(&self) -> &ReassemblyConfig {
        &self.config
    }

    /// Adds a peer using the configured default pending-event limit.
    pub fn register_target(&self, id: PeerId) {
        self.register_target_with_limit(id, self.config.default_max_pending_events);
    }

    /// Adds a peer which may have at most `max_pending_events` incomplete
    /// inbound events at once. Registering an existing peer replaces its
    /// limit; receives still in flight count against the new one.
    pub fn register_target_with_limit(&self, id: PeerId, max_pending_events: Option<u8>) {
        let mut state = self.state.lock();
        let in_flight = state.receive_list.get(&id).map_or(0, |events| {
            events.values().filter(|event| !event.is_completed()).count()
        });
        let in_flight = u8::try_from(in_flight).unwrap_or(u8::MAX);
        state.targets.insert(
            id,
            Target {
                max_pending_events,
                pending_budget: max_pending_events.map(|limit| limit.saturating_sub(in_flight)),
            },
        );
    }

    /// Removes a peer and every piece of send and receive state referring to
    /// it. Returns `false` if the peer was not registered.
    pub fn unregister_target(&self, id: PeerId) -> bool {
        let mut state = self.state.lock();
        if state.targets.remove(&id).is_none() {
            return false;
        }

        state.receive_list.remove(&id);
        for event in state.send_list.values_mut() {
            event.targets.remove(&id);
        }
        state.send_list.retain(|_, event| !event.targets.is_empty());

        true
    }

    /// Schedules `event_name` with `payload` for delivery.
    ///
    /// `bytes_per_second <= 0` selects the configured default rate. Events
    /// whose encoding reaches the maximum packet size, unknown peers, and
    /// broadcasts with no registered peers are dropped and yield `None`.
    pub fn trigger_event(
        &self,
        target: EventTarget,
        event_name: &str,
        payload: &[u8],
        bytes_per_second: i32,
    ) -> Option<EventId> {
        let bytes_per_second = if bytes_per_second <= 0 {
            self.config.default_bytes_per_second
        } else {
            bytes_per_second as u32
        };

        let encoded_len = ApplicationEvent::encoded_len(event_name, payload);
        if encoded_len >= self.config.max_packet_size() {
            debug!(
                "Dropping oversized event '{}' ({} bytes, limit {})",
                event_name,
                encoded_len,
                self.config.max_packet_size()
            );
            return None;
        }

        let total_packets = self.config.fragment_count(encoded_len);
        if total_packets > self.config.max_fragments() {
            debug!(
                "Dropping event '{}': {} fragments exceed the limit of {}",
                event_name,
                total_packets,
                self.config.max_fragments()
            );
            return None;
        }

        let encoded = match ApplicationEvent::encode(event_name, payload) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!("Dropping event: {}", error);
                return None;
            }
        };

        let mut state = self.state.lock();
        let targets: Vec<PeerId> = match target {
            EventTarget::Broadcast => state.targets.keys().copied().collect(),
            EventTarget::Peer(id) => {
                if !state.targets.contains_key(&id) {
                    debug!("Dropping event '{}' for unknown peer {}", event_name, id);
                    return None;
                }
                vec![id]
            }
        };

        if targets.is_empty() {
            return None;
        }

        let event_id = state.next_event_id;
        state.next_event_id = state.next_event_id.wrapping_add(1);
        state.send_list.insert(
            event_id,
            SendEvent::new(encoded, bytes_per_second, total_packets as u32, targets),
        );

        Some(event_id)
    }

    /// Advances pacing and retransmission, and collects expired receive
    /// state. Call once per network frame.
    pub fn network_tick(&self, now: &Instant) {
        let mut outgoing = Outgoing::new();
        {
            let mut state = self.state.lock();
            let elapsed = match state.last_tick {
                Some(last_tick) => now.duration_since(&last_tick),
                None => Duration::ZERO,
            };
            state.last_tick = Some(*now);

            state.tick_send_list(&self.config, now, elapsed, &mut outgoing);
            state.collect_receive_list(&self.config, now);
        }
        self.flush(outgoing);
    }

    /// Processes one inbound datagram. Invalid packets are dropped.
    pub fn handle_packet(&self, source: PeerId, data: &[u8], now: &Instant) {
        if let Err(error) = self.try_handle_packet(source, data, now) {
            debug!("Dropped event packet from peer {}: {}", source, error);
        }
    }

    /// Processes one inbound datagram, reporting why it was dropped.
    ///
    /// No state is mutated for a packet that fails validation. A fragment
    /// that was stored is acknowledged even if the event it completes later
    /// fails to decode.
    pub fn try_handle_packet(
        &self,
        source: PeerId,
        data: &[u8],
        now: &Instant,
    ) -> Result<(), ReassemblyError> {
        let mut reader = BitReader::new(data);
        let packet = EventPacket::parse(&mut reader, &self.config)?;

        if packet.total_packets == 0 {
            return Err(ReassemblyError::EmptyEvent {
                peer: source,
                event_id: packet.event_id,
            });
        }

        if packet.is_ack() {
            self.state.lock().handle_ack(source, &packet);
            return Ok(());
        }

        let mut outgoing = Outgoing::new();
        let completed = self
            .state
            .lock()
            .receive_fragment(&self.config, source, packet, now, &mut outgoing)?;
        self.flush(outgoing);

        match completed {
            Some((event_id, bytes)) => self.deliver(source, event_id, &bytes),
            None => Ok(()),
        }
    }

    fn deliver(&self, source: PeerId, event_id: EventId, bytes: &[u8]) -> Result<(), ReassemblyError> {
        let event = ApplicationEvent::decode(bytes)?;

        if self.sink.limit_event(source) {
            return Err(ReassemblyError::EventLimited {
                peer: source,
                event_id,
            });
        }

        trace!(
            "Reassembled event '{}' ({} bytes) from peer {}",
            event.name,
            event.payload.len(),
            source
        );
        self.dispatch
            .queue_event(&event.name, event.payload, format!("net:{}", source));
        Ok(())
    }

    fn flush(&self, outgoing: Outgoing) {
        for (target, data) in outgoing {
            self.sink.send_packet(target, &data);
        }
    }

    // Introspection

    pub fn targets(&self) -> Vec<PeerId> {
        let state = self.state.lock();
        let mut targets: Vec<PeerId> = state.targets.keys().copied().collect();
        targets.sort_unstable();
        targets
    }

    /// Number of outbound events still awaiting acknowledgement.
    pub fn pending_send_count(&self) -> usize {
        self.state.lock().send_list.len()
    }

    pub fn has_send_event(&self, event_id: EventId) -> bool {
        self.state.lock().send_list.contains_key(&event_id)
    }

    /// Number of incomplete inbound events from `peer`.
    pub fn pending_receive_count(&self, peer: PeerId) -> usize {
        self.state
            .lock()
            .receive_list
            .get(&peer)
            .map(|events| events.values().filter(|event| !event.is_completed()).count())
            .unwrap_or(0)
    }

    /// `(received, total)` fragment counts of an inbound event, including
    /// completed events that are still remembered.
    pub fn receive_progress(&self, peer: PeerId, event_id: EventId) -> Option<(u32, u32)> {
        let state = self.state.lock();
        let event = state.receive_list.get(&peer)?.get(&event_id)?;
        Some((event.received.count_ones() as u32, event.total_packets()))
    }

    /// Whether any registration, send or receive state refers to `peer`.
    pub fn has_peer_state(&self, peer: PeerId) -> bool {
        let state = self.state.lock();
        state.targets.contains_key(&peer)
            || state.receive_list.contains_key(&peer)
            || state
                .send_list
                .values()
                .any(|event| event.targets.contains_key(&peer))
    }
}

impl ReassemblyState {
    fn handle_ack(&mut self, source: PeerId, packet: &EventPacket) {
        let Some(target_data) = self
            .send_list
            .get_mut(&packet.event_id)
            .and_then(|event| event.targets.get_mut(&source))
        else {
            trace!(
                "Ignoring ack for event {} from peer {}",
                packet.event_id,
                source
            );
            return;
        };

        target_data.ack_bits.set(packet.packet_idx as usize);
    }

    fn receive_fragment(
        &mut self,
        config: &ReassemblyConfig,
        source: PeerId,
        packet: EventPacket,
        now: &Instant,
        outgoing: &mut Outgoing,
    ) -> Result<Option<(EventId, Vec<u8>)>, ReassemblyError> {
        if packet.total_packets as usize > config.max_fragments() {
            return Err(ReassemblyError::CapacityExceeded {
                size: packet.total_packets as usize,
                limit: config.max_fragments(),
            });
        }
        if packet.packet_idx >= packet.total_packets {
            return Err(ReassemblyError::FragmentOutOfRange {
                packet_idx: packet.packet_idx,
                total_packets: packet.total_packets,
            });
        }
        if packet.payload.len() > config.fragment_size() {
            return Err(ReassemblyError::FragmentTooLarge {
                size: packet.payload.len(),
                limit: config.fragment_size(),
            });
        }

        let ReassemblyState {
            receive_list,
            targets,
            ..
        } = self;

        let is_new = receive_list
            .get(&source)
            .map_or(true, |events| !events.contains_key(&packet.event_id));
        if is_new {
            let Some(target) = targets.get_mut(&source) else {
                return Err(ReassemblyError::UnknownSource { peer: source });
            };

            match target.pending_budget {
                Some(0) => return Err(ReassemblyError::PendingLimitReached { peer: source }),
                Some(budget) => target.pending_budget = Some(budget - 1),
                None => {}
            }
        }

        let event = receive_list
            .entry(source)
            .or_default()
            .entry(packet.event_id)
            .or_insert_with(|| ReceiveEvent::new(packet.total_packets, now));

        if event.total_packets() != packet.total_packets {
            return Err(ReassemblyError::FragmentCountMismatch {
                peer: source,
                event_id: packet.event_id,
                declared: event.total_packets(),
                received: packet.total_packets,
            });
        }

        let ack = EventPacket::ack(packet.event_id, packet.packet_idx, packet.total_packets);
        outgoing.push((source, ack.to_bytes(config)));

        if event.is_completed() || event.has_fragment(packet.packet_idx) {
            trace!(
                "Re-acking duplicate fragment {} of event {} from peer {}",
                packet.packet_idx,
                packet.event_id,
                source
            );
            event.last_activity = *now;
            return Ok(None);
        }

        event.insert(packet.packet_idx, packet.payload, now);
        if !event.has_all() {
            return Ok(None);
        }

        let bytes = event.assemble(now);
        if let Some(target) = targets.get_mut(&source) {
            target.release_pending();
        }

        Ok(Some((packet.event_id, bytes)))
    }

    fn tick_send_list(
        &mut self,
        config: &ReassemblyConfig,
        now: &Instant,
        elapsed: Duration,
        outgoing: &mut Outgoing,
    ) {
        let fragment_size = config.fragment_size();
        let ReassemblyState {
            send_list, targets, ..
        } = self;

        let mut done_events = Vec::new();
        for (event_id, event) in send_list.iter_mut() {
            let latency = event.latency(fragment_size);
            let SendEvent {
                payload,
                total_packets,
                targets: target_data,
                ..
            } = event;

            let mut done_targets = Vec::new();
            for (peer, data) in target_data.iter_mut() {
                if !targets.contains_key(peer) || data.ack_bits.is_full() {
                    done_targets.push(*peer);
                    continue;
                }

                if !data.can_send(latency, now) {
                    // keep a delayed target from bursting as soon as the delay ends
                    if data.is_delayed(now) {
                        data.last_send = Some(*now);
                    }
                    continue;
                }

                let bit_count = data.ack_bits.len();
                let start_bit = data.last_bit;
                let mut remaining = elapsed;

                loop {
                    let mut force_burst_delay = false;
                    match data.ack_bits.first_unset_in(data.last_bit, bit_count) {
                        Some(packet_idx) => {
                            data.last_bit = (packet_idx + 1) % bit_count;

                            let packet = EventPacket::fragment(
                                *event_id,
                                packet_idx as u32,
                                *total_packets,
                                fragment_of(payload, packet_idx, fragment_size),
                            );
                            outgoing.push((*peer, packet.to_bytes(config)));

                            if remaining > latency {
                                remaining -= latency;
                            }
                        }
                        None => match data.ack_bits.first_unset_in(0, data.last_bit) {
                            Some(first_unacked) => {
                                data.last_bit = first_unacked;
                                force_burst_delay = true;
                            }
                            None => {
                                done_targets.push(*peer);
                                break;
                            }
                        },
                    }

                    if data.last_bit <= start_bit || force_burst_delay {
                        data.delay_next_send = Some(now.plus(config.burst_delay));
                        break;
                    }
                    if remaining <= latency {
                        break;
                    }
                }

                data.last_send = Some(*now);
            }

            for peer in done_targets {
                target_data.remove(&peer);
            }
            if target_data.is_empty() {
                done_events.push(*event_id);
            }
        }

        for event_id in done_events {
            debug!("Event {} delivered to all targets", event_id);
            send_list.remove(&event_id);
        }
    }

    fn collect_receive_list(&mut self, config: &ReassemblyConfig, now: &Instant) {
        let ReassemblyState {
            receive_list,
            targets,
            ..
        } = self;

        for (peer, events) in receive_list.iter_mut() {
            events.retain(|event_id, event| {
                let idle = event.last_activity.elapsed(now);
                if event.is_completed() {
                    return idle < config.completed_retention;
                }

                match config.stalled_receive_timeout {
                    Some(timeout) if idle >= timeout => {
                        debug!(
                            "Evicting stalled event {} from peer {} ({}/{} fragments)",
                            event_id,
                            peer,
                            event.received.count_ones(),
                            event.total_packets()
                        );
                        if let Some(target) = targets.get_mut(peer) {
                            target.release_pending();
                        }
                        false
                    }
                    _ => true,
                }
            });
        }

        receive_list.retain(|_, events| !events.is_empty());
    }
}
