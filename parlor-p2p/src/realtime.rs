//! Real-time session wire driver.
//!
//! The authoritative side (the player who offered the room) runs the full
//! simulation and is the only one that decides scoring. The other side
//! simulates just its own paddle, reports its input target at a bounded
//! interval, and blends everything else toward incoming snapshots.

use crate::error::Result;
use crate::wire::MoveKind;
use instant::Instant;
use parlor_core::arena::{ArenaConfig, ArenaEvent, ArenaSnapshot, ArenaState, SyncTuning, Vec2};
use parlor_core::Seat;

pub struct RealtimeSession {
    arena: ArenaState,
    tuning: SyncTuning,
    seat: Seat,
    authoritative: bool,
    last_tick: Option<Instant>,
    /// Wall time owed to the fixed-step loop, under one tick
    tick_debt: f32,
    last_snapshot: Option<Instant>,
    last_input: Option<Instant>,
}

impl RealtimeSession {
    pub fn new(config: ArenaConfig, tuning: SyncTuning, seat: Seat, authoritative: bool) -> Self {
        let mut arena = ArenaState::new(config);
        arena.start();

        Self {
            arena,
            tuning,
            seat,
            authoritative,
            last_tick: None,
            tick_debt: 0.0,
            last_snapshot: None,
            last_input: None,
        }
    }

    pub fn arena(&self) -> &ArenaState {
        &self.arena
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// Record the local player's input target
    pub fn set_target(&mut self, target: Vec2) {
        self.arena.set_target(self.seat, target);
    }

    /// Advance the simulation to `now` and return the wire payloads that
    /// fell due. The arena runs in fixed steps counted off wall time, so
    /// game speed is independent of the caller's poll cadence. Snapshots
    /// and input reports are emitted at their bounded intervals, not
    /// every step.
    pub fn tick(&mut self, now: Instant) -> Result<Vec<(MoveKind, serde_json::Value)>> {
        let dt = self.tuning.tick_dt();
        let steps = self.steps_due(now, dt);
        let mut out = Vec::new();

        if self.authoritative {
            for _ in 0..steps {
                for event in self.arena.step(dt) {
                    out.push((MoveKind::ArenaEvent, serde_json::to_value(event)?));
                }
            }

            if self.due(self.last_snapshot, now, self.tuning.snapshot_interval) {
                self.last_snapshot = Some(now);
                out.push((
                    MoveKind::ArenaSnapshot,
                    serde_json::to_value(self.arena.snapshot())?,
                ));
            }
        } else {
            for _ in 0..steps {
                self.arena.step_paddle(self.seat, dt);
            }

            if self.due(self.last_input, now, self.tuning.input_interval) {
                self.last_input = Some(now);
                out.push((
                    MoveKind::ArenaInput,
                    serde_json::to_value(self.arena.target(self.seat))?,
                ));
            }
        }

        Ok(out)
    }

    /// Apply an inbound payload from the opponent. Returns the scoring
    /// event when one was adopted, for the app to surface.
    pub fn handle(
        &mut self,
        kind: MoveKind,
        payload: serde_json::Value,
    ) -> Result<Option<ArenaEvent>> {
        match kind {
            MoveKind::ArenaInput if self.authoritative => {
                let target: Vec2 = serde_json::from_value(payload)?;
                self.arena.set_target(self.seat.other(), target);
                Ok(None)
            }
            MoveKind::ArenaSnapshot if !self.authoritative => {
                let snapshot: ArenaSnapshot = serde_json::from_value(payload)?;
                self.arena.blend_toward(
                    &snapshot,
                    self.tuning.blend_factor,
                    Some(ArenaState::paddle_entity(self.seat)),
                );
                Ok(None)
            }
            MoveKind::ArenaEvent if !self.authoritative => {
                let event: ArenaEvent = serde_json::from_value(payload)?;
                self.arena.apply_event(event);
                Ok(Some(event))
            }
            other => {
                // Wrong direction for our role, or turn traffic; ignore
                tracing::debug!(?other, authoritative = self.authoritative, "payload ignored");
                Ok(None)
            }
        }
    }

    /// Reset for a rematch; the same side stays authoritative
    pub fn rematch(&mut self) {
        self.arena.reset_for_rematch();
        self.last_tick = None;
        self.tick_debt = 0.0;
        self.last_snapshot = None;
        self.last_input = None;
    }

    /// Fixed steps owed since the last poll. A long stall resumes with a
    /// bounded burst instead of replaying the whole gap.
    fn steps_due(&mut self, now: Instant, dt: f32) -> u32 {
        const MAX_BURST: u32 = 8;

        let elapsed = match self.last_tick {
            None => dt,
            Some(last) => now.duration_since(last).as_secs_f32() + self.tick_debt,
        };
        self.last_tick = Some(now);

        let steps = (elapsed / dt) as u32;
        if steps > MAX_BURST {
            self.tick_debt = 0.0;
            return MAX_BURST;
        }
        self.tick_debt = elapsed - steps as f32 * dt;
        steps
    }

    fn due(&self, last: Option<Instant>, now: Instant, interval: instant::Duration) -> bool {
        match last {
            None => true,
            Some(last) => now.duration_since(last) >= interval,
        }
    }
}
