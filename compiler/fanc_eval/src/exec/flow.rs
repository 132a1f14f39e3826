//! Statement execution and the work stack.

use fanc_ir::{ensure_sufficient_stack, FlowPoint, NodeKind, StmtKind, Value, ValueKind};
use smallvec::{smallvec, SmallVec};

use super::Machine;
use crate::{Pointer, RuntimeContext};

/// Exit indices a statement continues through, in execution order.
type Exits = SmallVec<[usize; 2]>;

fn after() -> Exits {
    smallvec![StmtKind::AFTER_EXIT]
}

/// The branch exit when `fired`, then `After`.
fn branch(fired: bool) -> Exits {
    if fired {
        smallvec![StmtKind::BRANCH_EXIT, StmtKind::AFTER_EXIT]
    } else {
        after()
    }
}

impl<C: RuntimeContext + ?Sized> Machine<'_, C> {
    /// Execute `start` and everything reachable from it, depth first.
    ///
    /// Points are pushed in reverse so the first exit, and within it the
    /// first wire, runs first.
    pub(crate) fn run(&mut self, start: Vec<FlowPoint>) {
        let mut stack = start;
        stack.reverse();
        while let Some(point) = stack.pop() {
            let next = self.execute(point);
            stack.extend(next.into_iter().rev());
        }
    }

    /// Execute one statement and return the flow points it continues to.
    fn execute(&mut self, point: FlowPoint) -> Vec<FlowPoint> {
        let program = self.program;
        let env = point.env;
        let node = program.env(env).tree.node(point.node);
        let NodeKind::Stmt(kind) = &node.kind else {
            return Vec::new();
        };
        self.executed += 1;
        tracing::trace!(%env, pos = %node.pos, block = %node.describe(), "execute");

        let exits = match kind {
            StmtKind::Win { delay } => {
                self.ctx.win(*delay);
                after()
            }
            StmtKind::Lose { delay } => {
                self.ctx.lose(*delay);
                after()
            }
            StmtKind::SetScore { ranking } => {
                let score = self.value(env, node, 0).as_float();
                let coins = self.value(env, node, 1).as_float();
                self.ctx.set_score(score, coins, *ranking);
                after()
            }
            StmtKind::SetCamera { perspective } => {
                let position = self.value(env, node, 0).as_vec3();
                let rotation = self.value(env, node, 1).as_rot();
                let range = self.value(env, node, 2).as_float();
                self.ctx.set_camera(position, rotation, range, *perspective);
                after()
            }
            StmtKind::SetLight => {
                let position = self.value(env, node, 0).as_vec3();
                let rotation = self.value(env, node, 1).as_rot();
                self.ctx.set_light(position, rotation);
                after()
            }
            StmtKind::SetGravity => {
                let gravity = self.value(env, node, 0).as_vec3();
                self.ctx.set_gravity(gravity);
                after()
            }
            StmtKind::SetPosition => {
                let object = self.value(env, node, 0).as_obj();
                let position = self.value(env, node, 1).as_vec3();
                let rotation = self.value(env, node, 2).as_rot();
                self.ctx.set_position(object, position, rotation);
                after()
            }
            StmtKind::SetVisible => {
                let object = self.value(env, node, 0).as_obj();
                let visible = self.value(env, node, 1).as_bool();
                self.ctx.set_visible(object, visible);
                after()
            }
            StmtKind::CreateObject => {
                let original = self.value(env, node, 0).as_obj();
                let copy = self.ctx.create_object(original);
                self.store(point, smallvec![Value::Obj(copy)]);
                after()
            }
            StmtKind::DestroyObject => {
                let object = self.value(env, node, 0).as_obj();
                self.ctx.destroy_object(object);
                after()
            }
            StmtKind::PlaySound { looping, sound } => {
                let volume = self.value(env, node, 0).as_float();
                let pitch = self.value(env, node, 1).as_float();
                let channel = self.ctx.play_sound(volume, pitch, *sound, *looping);
                self.store(point, smallvec![Value::Float(channel)]);
                after()
            }
            StmtKind::StopSound => {
                let channel = self.value(env, node, 0).as_float();
                self.ctx.stop_sound(channel);
                after()
            }
            StmtKind::AddForce => {
                let object = self.value(env, node, 0).as_obj();
                let force = self.value(env, node, 1).as_vec3();
                let applied_at = self.value(env, node, 2).as_vec3();
                let torque = self.value(env, node, 3).as_vec3();
                self.ctx.add_force(object, force, applied_at, torque);
                after()
            }
            StmtKind::SetVelocity => {
                let object = self.value(env, node, 0).as_obj();
                let velocity = self.value(env, node, 1).as_vec3();
                let spin = self.value(env, node, 2).as_vec3();
                self.ctx.set_velocity(object, velocity, spin);
                after()
            }
            StmtKind::If => {
                if self.value(env, node, 0).as_bool() {
                    smallvec![StmtKind::BRANCH_EXIT, StmtKind::AFTER_EXIT]
                } else {
                    smallvec![StmtKind::ELSE_EXIT, StmtKind::AFTER_EXIT]
                }
            }
            StmtKind::Loop => {
                self.run_loop(point);
                after()
            }
            StmtKind::PlaySensor => branch(self.frame == 0),
            StmtKind::LateUpdate => {
                let late = program.exit_points(env, point.node, StmtKind::BRANCH_EXIT);
                if self.defer_late {
                    self.late.extend(late);
                } else {
                    ensure_sufficient_stack(|| self.run(late));
                }
                after()
            }
            StmtKind::TouchSensor { state, finger } => {
                let touch = self.ctx.touch(*state, *finger);
                if let Some((x, y)) = touch {
                    self.store(point, smallvec![Value::Float(x), Value::Float(y)]);
                }
                branch(touch.is_some())
            }
            StmtKind::SwipeSensor => {
                let swipe = self.ctx.swipe();
                if let Some(direction) = swipe {
                    self.store(point, smallvec![Value::Vec3(direction)]);
                }
                branch(swipe.is_some())
            }
            StmtKind::Button { kind } => branch(self.ctx.button(*kind)),
            StmtKind::Collision => {
                let object = self.value(env, node, 0).as_obj();
                let collision = self.ctx.collision(object);
                if let Some(hit) = collision {
                    self.store(
                        point,
                        smallvec![
                            Value::Obj(hit.other),
                            Value::Float(hit.impulse),
                            Value::Vec3(hit.normal)
                        ],
                    );
                }
                branch(collision.is_some())
            }
            StmtKind::RandomSeed => {
                let seed = self.value(env, node, 0).as_float();
                self.ctx.random_seed(seed);
                after()
            }
            StmtKind::SetVariable { var } => {
                let kind = node
                    .inputs
                    .first()
                    .and_then(|input| input.kind.value_kind())
                    .unwrap_or(ValueKind::Float);
                let value = self.value(env, node, 0);
                if let Some(id) = program.env(env).variables.get(usize::from(var.0)) {
                    self.ctx.set_value(Pointer::new(*id, kind), value);
                }
                after()
            }
            StmtKind::SetPointer => {
                let value = self.value(env, node, 1);
                if let Some(pointer) = self.pointer(env, node, 0) {
                    self.ctx.set_value(pointer, value);
                }
                after()
            }
            StmtKind::IncrementNumber => {
                self.step_number(point, 1.0);
                after()
            }
            StmtKind::DecrementNumber => {
                self.step_number(point, -1.0);
                after()
            }
            StmtKind::Inspect => {
                let value = self.value(env, node, 0);
                self.ctx.inspect(value, env, node.pos);
                after()
            }
            // The body continues through the host's exits on its own.
            StmtKind::Custom(_) => return program.enter_custom(point).unwrap_or_default(),
        };

        let mut next = Vec::new();
        for exit in exits {
            next.extend(program.exit_points(env, point.node, exit));
        }
        next
    }

    /// Run the `Do` flow once per counter value from start toward stop,
    /// stop excluded. Both bounds are read once.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "iteration counts are whole and non-negative"
    )]
    fn run_loop(&mut self, point: FlowPoint) {
        let program = self.program;
        let node = program.env(point.env).tree.node(point.node);
        let start = self.value(point.env, node, 0).as_float();
        let stop = self.value(point.env, node, 1).as_float();
        let step = if stop >= start { 1.0 } else { -1.0 };
        let iterations = (stop - start).abs().ceil() as u64;
        let body = program.exit_points(point.env, point.node, StmtKind::BRANCH_EXIT);

        for i in 0..iterations {
            self.store(point, smallvec![Value::Float(start + step * i as f32)]);
            ensure_sufficient_stack(|| self.run(body.clone()));
        }
    }

    fn step_number(&mut self, point: FlowPoint, delta: f32) {
        let program = self.program;
        let node = program.env(point.env).tree.node(point.node);
        if let Some(pointer) = self.pointer(point.env, node, 0) {
            let current = self.ctx.get_value(pointer).as_float();
            self.ctx.set_value(pointer, Value::Float(current + delta));
        }
    }

    fn store(&mut self, point: FlowPoint, outputs: fanc_ir::Outputs) {
        self.state.insert((point.env, point.node), outputs);
    }
}
