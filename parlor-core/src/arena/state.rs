use crate::arena::{ArenaSnapshot, EntityId, EntityState, Vec2};
use crate::domain::Seat;
use serde::{Deserialize, Serialize};

/// Simulation lifecycle of a real-time session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Discrete events decided exclusively by the authoritative side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArenaEvent {
    /// A goal was scored; carries the full score so the mirror never has
    /// to derive it
    Goal { scorer: Seat, score: [u32; 2] },
    /// The match ended
    Ended { winner: Seat },
}

/// Static parameters of the duel arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub paddle_radius: f32,
    pub ball_radius: f32,
    /// Ball speed right after a serve
    pub serve_speed: f32,
    pub max_ball_speed: f32,
    /// First side to reach this score wins
    pub target_score: u32,
    /// Stiffness of the critically-damped paddle pursuit; the same rule
    /// runs on both sides
    pub pursuit_stiffness: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            paddle_radius: 20.0,
            ball_radius: 10.0,
            serve_speed: 260.0,
            max_ball_speed: 650.0,
            target_score: 5,
            pursuit_stiffness: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Paddle {
    pos: Vec2,
    vel: Vec2,
    /// Latest input target; the paddle pursues it, it never teleports
    target: Vec2,
}

/// The two-paddle-one-ball duel arena.
///
/// `step` is the full authoritative step. The non-authoritative side calls
/// only `step_paddle` for its own entity and `blend_toward` for the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaState {
    config: ArenaConfig,
    phase: SimPhase,
    paddles: [Paddle; 2],
    ball_pos: Vec2,
    ball_vel: Vec2,
    score: [u32; 2],
    /// Simulation clock in seconds since start
    clock: f32,
}

impl ArenaState {
    pub fn new(config: ArenaConfig) -> Self {
        let mut state = Self {
            config,
            phase: SimPhase::Idle,
            paddles: [
                Paddle {
                    pos: Vec2::ZERO,
                    vel: Vec2::ZERO,
                    target: Vec2::ZERO,
                },
                Paddle {
                    pos: Vec2::ZERO,
                    vel: Vec2::ZERO,
                    target: Vec2::ZERO,
                },
            ],
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            score: [0, 0],
            clock: 0.0,
        };
        state.reset_positions();
        state
    }

    // ===== Lifecycle =====

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn start(&mut self) {
        if self.phase == SimPhase::Idle {
            self.phase = SimPhase::Running;
            self.serve(Seat::Responder);
        }
    }

    pub fn pause(&mut self) {
        if self.phase == SimPhase::Running {
            self.phase = SimPhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == SimPhase::Paused {
            self.phase = SimPhase::Running;
        }
    }

    /// Full reset for a rematch: zero score, fresh positions, running again
    pub fn reset_for_rematch(&mut self) {
        self.score = [0, 0];
        self.clock = 0.0;
        self.reset_positions();
        self.phase = SimPhase::Running;
        self.serve(Seat::Responder);
    }

    // ===== Queries =====

    pub fn score(&self) -> [u32; 2] {
        self.score
    }

    pub fn clock_ms(&self) -> u64 {
        (self.clock * 1000.0) as u64
    }

    pub fn entity(&self, id: EntityId) -> EntityState {
        match id {
            EntityId::PaddleStarter => {
                EntityState::new(self.paddles[0].pos, self.paddles[0].vel)
            }
            EntityId::PaddleResponder => {
                EntityState::new(self.paddles[1].pos, self.paddles[1].vel)
            }
            EntityId::Ball => EntityState::new(self.ball_pos, self.ball_vel),
        }
    }

    pub fn paddle_entity(seat: Seat) -> EntityId {
        match seat {
            Seat::Starter => EntityId::PaddleStarter,
            Seat::Responder => EntityId::PaddleResponder,
        }
    }

    /// Capture the current state of every entity
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot::new(self.clock_ms())
            .with_entity(EntityId::PaddleStarter, self.entity(EntityId::PaddleStarter))
            .with_entity(
                EntityId::PaddleResponder,
                self.entity(EntityId::PaddleResponder),
            )
            .with_entity(EntityId::Ball, self.entity(EntityId::Ball))
    }

    // ===== Input =====

    /// Record the latest input target for a paddle. The paddle pursues the
    /// target with critical damping instead of following raw input, which
    /// keeps motion smooth despite sparse network updates.
    pub fn set_target(&mut self, seat: Seat, target: Vec2) {
        self.paddles[seat.index()].target = target;
    }

    pub fn target(&self, seat: Seat) -> Vec2 {
        self.paddles[seat.index()].target
    }

    // ===== Authoritative step =====

    /// Advance the full simulation by `dt` seconds and report any scoring
    /// events. Only the authoritative side calls this.
    pub fn step(&mut self, dt: f32) -> Vec<ArenaEvent> {
        if self.phase != SimPhase::Running {
            return Vec::new();
        }

        self.clock += dt;

        self.advance_paddle(Seat::Starter, dt);
        self.advance_paddle(Seat::Responder, dt);
        self.advance_ball(dt);

        let mut events = Vec::new();
        if let Some(scorer) = self.check_goal() {
            self.score[scorer.index()] += 1;
            events.push(ArenaEvent::Goal {
                scorer,
                score: self.score,
            });

            if self.score[scorer.index()] >= self.config.target_score {
                self.phase = SimPhase::Ended;
                events.push(ArenaEvent::Ended { winner: scorer });
            } else {
                self.reset_positions();
                // Conceder receives the serve
                self.serve(scorer.other());
            }
        }

        events
    }

    /// Advance only one paddle (the non-authoritative side's own entity)
    pub fn step_paddle(&mut self, seat: Seat, dt: f32) {
        if self.phase == SimPhase::Running {
            self.clock += dt;
            self.advance_paddle(seat, dt);
        }
    }

    // ===== Mirror-side application =====

    /// Blend every entity a fixed fraction toward the snapshot, never
    /// overwriting outright; `skip` is the locally simulated entity.
    /// Naive overwrite produces visible teleporting.
    pub fn blend_toward(&mut self, snapshot: &ArenaSnapshot, blend: f32, skip: Option<EntityId>) {
        for (&id, target) in &snapshot.entities {
            if Some(id) == skip {
                continue;
            }

            match id {
                EntityId::PaddleStarter => {
                    let p = &mut self.paddles[0];
                    p.pos = p.pos.lerp(target.position(), blend);
                    p.vel = target.velocity();
                }
                EntityId::PaddleResponder => {
                    let p = &mut self.paddles[1];
                    p.pos = p.pos.lerp(target.position(), blend);
                    p.vel = target.velocity();
                }
                EntityId::Ball => {
                    self.ball_pos = self.ball_pos.lerp(target.position(), blend);
                    self.ball_vel = target.velocity();
                }
            }
        }
    }

    /// Adopt a broadcast scoring event. The mirror never decides scoring
    /// itself, so game-over decisions cannot diverge.
    pub fn apply_event(&mut self, event: ArenaEvent) {
        match event {
            ArenaEvent::Goal { score, .. } => {
                self.score = score;
                self.reset_positions();
            }
            ArenaEvent::Ended { .. } => {
                self.phase = SimPhase::Ended;
            }
        }
    }

    // ===== Internals =====

    fn reset_positions(&mut self) {
        let w = self.config.width;
        let h = self.config.height;

        let left = Vec2::new(w * 0.25, h * 0.5);
        let right = Vec2::new(w * 0.75, h * 0.5);

        self.paddles[0] = Paddle {
            pos: left,
            vel: Vec2::ZERO,
            target: left,
        };
        self.paddles[1] = Paddle {
            pos: right,
            vel: Vec2::ZERO,
            target: right,
        };
        self.ball_pos = Vec2::new(w * 0.5, h * 0.5);
        self.ball_vel = Vec2::ZERO;
    }

    fn serve(&mut self, toward: Seat) {
        let dir = match toward {
            Seat::Starter => -1.0,
            Seat::Responder => 1.0,
        };
        self.ball_vel = Vec2::new(dir * self.config.serve_speed, 0.0);
    }

    /// Critically-damped pursuit of the input target
    fn advance_paddle(&mut self, seat: Seat, dt: f32) {
        let stiffness = self.config.pursuit_stiffness;
        let damping = 2.0 * stiffness.sqrt();

        let paddle = &mut self.paddles[seat.index()];
        let accel = (paddle.target - paddle.pos) * stiffness - paddle.vel * damping;
        paddle.vel += accel * dt;
        paddle.pos += paddle.vel * dt;

        // Clamp to the paddle's own half
        let r = self.config.paddle_radius;
        let (min_x, max_x) = match seat {
            Seat::Starter => (r, self.config.width * 0.5 - r),
            Seat::Responder => (self.config.width * 0.5 + r, self.config.width - r),
        };
        let paddle = &mut self.paddles[seat.index()];
        paddle.pos.x = paddle.pos.x.clamp(min_x, max_x);
        paddle.pos.y = paddle.pos.y.clamp(r, self.config.height - r);
    }

    fn advance_ball(&mut self, dt: f32) {
        self.ball_pos += self.ball_vel * dt;

        // Top/bottom walls reflect
        let r = self.config.ball_radius;
        if self.ball_pos.y - r < 0.0 {
            self.ball_pos.y = r;
            self.ball_vel.y = self.ball_vel.y.abs();
        } else if self.ball_pos.y + r > self.config.height {
            self.ball_pos.y = self.config.height - r;
            self.ball_vel.y = -self.ball_vel.y.abs();
        }

        for seat in [Seat::Starter, Seat::Responder] {
            self.collide_paddle(seat);
        }

        // Speed cap
        let speed = self.ball_vel.length();
        if speed > self.config.max_ball_speed {
            self.ball_vel = self.ball_vel.normalized_or_zero() * self.config.max_ball_speed;
        }
    }

    fn collide_paddle(&mut self, seat: Seat) {
        let paddle = self.paddles[seat.index()];
        let min_dist = self.config.paddle_radius + self.config.ball_radius;

        let offset = self.ball_pos - paddle.pos;
        let dist = offset.length();
        if dist >= min_dist {
            return;
        }

        let normal = if dist <= f32::EPSILON {
            // Ball exactly on the paddle center; push it toward mid-field
            Vec2::new(if seat == Seat::Starter { 1.0 } else { -1.0 }, 0.0)
        } else {
            offset.normalized_or_zero()
        };

        // Push out of penetration
        self.ball_pos = paddle.pos + normal * min_dist;

        // Reflect only if the ball moves into the paddle
        let approach = self.ball_vel.dot(normal);
        if approach < 0.0 {
            self.ball_vel = self.ball_vel - normal * (2.0 * approach);
        }

        // Paddle motion imparts momentum
        self.ball_vel += paddle.vel * 0.5;
    }

    fn check_goal(&self) -> Option<Seat> {
        let r = self.config.ball_radius;
        if self.ball_pos.x + r < 0.0 {
            // Ball out on the starter's side: responder scores
            Some(Seat::Responder)
        } else if self.ball_pos.x - r > self.config.width {
            Some(Seat::Starter)
        } else {
            None
        }
    }
}
