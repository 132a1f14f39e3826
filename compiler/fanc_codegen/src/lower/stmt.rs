//! Statement lowering.

use fanc_ir::{FlowPoint, NodeKind, StmtKind, ValueKind};

use super::{comment_text, Lowerer};
use crate::CodegenError;

impl Lowerer<'_> {
    /// Emit the statement at `point` followed by what its exits lead to.
    pub(super) fn emit_stmt(&mut self, point: FlowPoint) -> Result<(), CodegenError> {
        let program = self.program;
        let env = point.env;
        let tree = &program.env(env).tree;
        let node = tree.node(point.node);
        let NodeKind::Stmt(kind) = &node.kind else {
            return Err(CodegenError::NotAStatement {
                unit: tree.name.clone(),
                pos: node.pos,
                block: node.describe(),
            });
        };

        let location = self.block_location(env, point.node);
        self.ctx.mark_block(location);
        self.ctx.writeln(&format!(
            "/* {} {} {} */",
            comment_text(&tree.name),
            node.pos,
            comment_text(&node.describe())
        ));

        match kind {
            StmtKind::Win { delay } => self.ctx.writeln(&format!("h->win(h->user, {delay});")),
            StmtKind::Lose { delay } => self.ctx.writeln(&format!("h->lose(h->user, {delay});")),
            StmtKind::SetScore { ranking } => {
                let score = self.read_value(env, node, 0);
                let coins = self.read_value(env, node, 1);
                self.ctx.writeln(&format!(
                    "h->set_score(h->user, {score}, {coins}, {ranking});"
                ));
            }
            StmtKind::SetCamera { perspective } => {
                let position = self.read_value(env, node, 0);
                let rotation = self.read_value(env, node, 1);
                let range = self.read_value(env, node, 2);
                self.ctx.writeln(&format!(
                    "h->set_camera(h->user, {position}, {rotation}, {range}, {perspective});"
                ));
            }
            StmtKind::SetLight => {
                let position = self.read_value(env, node, 0);
                let rotation = self.read_value(env, node, 1);
                self.ctx
                    .writeln(&format!("h->set_light(h->user, {position}, {rotation});"));
            }
            StmtKind::SetGravity => {
                let gravity = self.read_value(env, node, 0);
                self.ctx.writeln(&format!("h->set_gravity(h->user, {gravity});"));
            }
            StmtKind::SetPosition => {
                let object = self.read_value(env, node, 0);
                let position = self.read_value(env, node, 1);
                let rotation = self.read_value(env, node, 2);
                self.ctx.writeln(&format!(
                    "h->set_position(h->user, {object}, {position}, {rotation});"
                ));
            }
            StmtKind::SetVisible => {
                let object = self.read_value(env, node, 0);
                let visible = self.read_value(env, node, 1);
                self.ctx
                    .writeln(&format!("h->set_visible(h->user, {object}, {visible});"));
            }
            StmtKind::CreateObject => {
                let original = self.read_value(env, node, 0);
                let slot = self.slot(env, point.node, 0, ValueKind::Obj);
                self.ctx
                    .writeln(&format!("{slot} = h->create_object(h->user, {original});"));
            }
            StmtKind::DestroyObject => {
                let object = self.read_value(env, node, 0);
                self.ctx
                    .writeln(&format!("h->destroy_object(h->user, {object});"));
            }
            StmtKind::PlaySound { looping, sound } => {
                let volume = self.read_value(env, node, 0);
                let pitch = self.read_value(env, node, 1);
                let slot = self.slot(env, point.node, 0, ValueKind::Float);
                self.ctx.writeln(&format!(
                    "{slot} = h->play_sound(h->user, {volume}, {pitch}, {sound}, {looping});"
                ));
            }
            StmtKind::StopSound => {
                let channel = self.read_value(env, node, 0);
                self.ctx.writeln(&format!("h->stop_sound(h->user, {channel});"));
            }
            StmtKind::AddForce => {
                let object = self.read_value(env, node, 0);
                let force = self.read_value(env, node, 1);
                let applied_at = self.read_value(env, node, 2);
                let torque = self.read_value(env, node, 3);
                self.ctx.writeln(&format!(
                    "h->add_force(h->user, {object}, {force}, {applied_at}, {torque});"
                ));
            }
            StmtKind::SetVelocity => {
                let object = self.read_value(env, node, 0);
                let velocity = self.read_value(env, node, 1);
                let spin = self.read_value(env, node, 2);
                self.ctx.writeln(&format!(
                    "h->set_velocity(h->user, {object}, {velocity}, {spin});"
                ));
            }
            StmtKind::If => {
                let condition = self.read_value(env, node, 0);
                let taken = program.exit_points(env, point.node, StmtKind::BRANCH_EXIT);
                let other = program.exit_points(env, point.node, StmtKind::ELSE_EXIT);
                self.ctx.writeln(&format!("if ({condition}) {{"));
                self.ctx.indent();
                for next in taken {
                    self.emit_point(next)?;
                }
                self.ctx.dedent();
                if other.is_empty() {
                    self.ctx.writeln("}");
                } else {
                    self.ctx.writeln("} else {");
                    self.ctx.indent();
                    for next in other {
                        self.emit_point(next)?;
                    }
                    self.ctx.dedent();
                    self.ctx.writeln("}");
                }
            }
            StmtKind::Loop => {
                let start = self.read_value(env, node, 0);
                let stop = self.read_value(env, node, 1);
                let step = self.ctx.fresh_temp();
                let count = self.ctx.fresh_temp();
                let i = self.ctx.fresh_temp();
                let counter = self.slot(env, point.node, 0, ValueKind::Float);
                self.ctx
                    .writeln(&format!("float {step} = {stop} >= {start} ? 1.0f : -1.0f;"));
                self.ctx
                    .writeln(&format!("uint64_t {count} = fc_loop_count({start}, {stop});"));
                self.ctx
                    .writeln(&format!("for (uint64_t {i} = 0; {i} < {count}; {i}++) {{"));
                self.ctx.indent();
                if self.budget {
                    self.ctx.writeln("FC_CHECK_BUDGET(h);");
                }
                self.ctx
                    .writeln(&format!("{counter} = {start} + {step} * (float){i};"));
                self.emit_exit(env, point.node, StmtKind::BRANCH_EXIT)?;
                self.ctx.dedent();
                self.ctx.writeln("}");
            }
            StmtKind::PlaySensor => {
                self.ctx.writeln("if (fc_frame == 0) {");
                self.emit_branch(point)?;
            }
            StmtKind::LateUpdate => {
                if !program
                    .exit_points(env, point.node, StmtKind::BRANCH_EXIT)
                    .is_empty()
                {
                    let late = self.request_late(env, point.node);
                    self.ctx.writeln(&format!("fc_defer(h, {late});"));
                }
            }
            StmtKind::TouchSensor { state, finger } => {
                let (x, y) = (self.ctx.fresh_temp(), self.ctx.fresh_temp());
                let slot_x = self.slot(env, point.node, 0, ValueKind::Float);
                let slot_y = self.slot(env, point.node, 1, ValueKind::Float);
                self.ctx.writeln(&format!("float {x}, {y};"));
                self.ctx.writeln(&format!(
                    "if (h->touch(h->user, {}, {finger}, &{x}, &{y})) {{",
                    state.index()
                ));
                self.ctx.indent();
                self.ctx.writeln(&format!("{slot_x} = {x};"));
                self.ctx.writeln(&format!("{slot_y} = {y};"));
                self.ctx.dedent();
                self.emit_branch(point)?;
            }
            StmtKind::SwipeSensor => {
                let direction = self.ctx.fresh_temp();
                let slot = self.slot(env, point.node, 0, ValueKind::Vec3);
                self.ctx.writeln(&format!("fc_vec3 {direction};"));
                self.ctx
                    .writeln(&format!("if (h->swipe(h->user, &{direction})) {{"));
                self.ctx.indent();
                self.ctx.writeln(&format!("{slot} = {direction};"));
                self.ctx.dedent();
                self.emit_branch(point)?;
            }
            StmtKind::Button { kind } => {
                self.ctx.writeln(&format!("if (h->button(h->user, {kind})) {{"));
                self.emit_branch(point)?;
            }
            StmtKind::Collision => {
                let object = self.read_value(env, node, 0);
                let (other, impulse, normal) = (
                    self.ctx.fresh_temp(),
                    self.ctx.fresh_temp(),
                    self.ctx.fresh_temp(),
                );
                let slots = [
                    self.slot(env, point.node, 0, ValueKind::Obj),
                    self.slot(env, point.node, 1, ValueKind::Float),
                    self.slot(env, point.node, 2, ValueKind::Vec3),
                ];
                self.ctx.writeln(&format!(
                    "fc_obj {other}; float {impulse}; fc_vec3 {normal};"
                ));
                self.ctx.writeln(&format!(
                    "if (h->collision(h->user, {object}, &{other}, &{impulse}, &{normal})) {{"
                ));
                self.ctx.indent();
                for (slot, temp) in slots.iter().zip([&other, &impulse, &normal]) {
                    self.ctx.writeln(&format!("{slot} = {temp};"));
                }
                self.ctx.dedent();
                self.emit_branch(point)?;
            }
            StmtKind::RandomSeed => {
                let seed = self.read_value(env, node, 0);
                self.ctx.writeln(&format!("h->random_seed(h->user, {seed});"));
            }
            StmtKind::SetVariable { var } => {
                let value = self.read_value(env, node, 0);
                let kind = node
                    .inputs
                    .first()
                    .and_then(|input| input.kind.value_kind())
                    .unwrap_or(ValueKind::Float);
                if let Some(id) = program.env(env).variables.get(usize::from(var.0)) {
                    self.ctx.writeln(&format!(
                        "fc_list_{}_set(&v{}, 0, {value});",
                        kind.name(),
                        id.0
                    ));
                }
            }
            StmtKind::SetPointer => {
                // The value is read before the pointer.
                let value = self.read_value(env, node, 1);
                let pointer = self.read_pointer(env, node, 0);
                let kind = node
                    .inputs
                    .first()
                    .and_then(|input| input.kind.value_kind())
                    .unwrap_or(ValueKind::Float);
                self.ctx
                    .writeln(&format!("fc_ptr_{}_set({pointer}, {value});", kind.name()));
            }
            StmtKind::IncrementNumber | StmtKind::DecrementNumber => {
                let delta = if matches!(kind, StmtKind::IncrementNumber) {
                    "1.0f"
                } else {
                    "(-1.0f)"
                };
                let pointer = self.read_pointer(env, node, 0);
                self.ctx.writeln(&format!(
                    "fc_ptr_float_set({pointer}, fc_ptr_float_get({pointer}) + {delta});"
                ));
            }
            StmtKind::Inspect => {
                let kind = node
                    .inputs
                    .first()
                    .and_then(|input| input.kind.value_kind())
                    .unwrap_or(ValueKind::Float);
                let value = self.read_value(env, node, 0);
                self.ctx.writeln(&format!(
                    "h->inspect(h->user, fc_value_{}({value}), {}, {}, {}, {});",
                    kind.name(),
                    env.0,
                    node.pos.x,
                    node.pos.y,
                    node.pos.z
                ));
            }
            // The body continues through the host's exits on its own.
            StmtKind::Custom(_) => {
                for next in program.enter_custom(point).unwrap_or_default() {
                    self.emit_point(next)?;
                }
                return Ok(());
            }
        }

        self.emit_exit(env, point.node, StmtKind::AFTER_EXIT)
    }

    /// Close a sensor's `if` after emitting its branch exit. The caller has
    /// written the opening line.
    fn emit_branch(&mut self, point: FlowPoint) -> Result<(), CodegenError> {
        self.ctx.indent();
        self.emit_exit(point.env, point.node, StmtKind::BRANCH_EXIT)?;
        self.ctx.dedent();
        self.ctx.writeln("}");
        Ok(())
    }
}
