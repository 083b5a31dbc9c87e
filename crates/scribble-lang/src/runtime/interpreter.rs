//! Tree-walking evaluator. Every condition that would be an error in a
//! stricter language — undefined names, bad indexing, unparseable text —
//! is reported to the diagnostic sink and evaluation continues with
//! `undefined`, so one bad line never stops the animation.

use rand::Rng;

use crate::draw::{Color, DrawCommand, Shape};
use crate::error::Diagnostic;
use crate::runtime::RuntimeState;
use crate::runtime::scope::{GLOBAL, ScopeId};
use crate::runtime::value::Value;
use crate::syntax::ast::{BinOp, Expr, Stmt, UnOp};

/// Script recursion rides the native stack, so unbounded recursion has to be
/// cut off before it overflows it.
pub const MAX_CALL_DEPTH: usize = 200;

pub(crate) struct Interpreter<'a> {
    state: &'a mut RuntimeState,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(state: &'a mut RuntimeState) -> Self {
        Self { state, depth: 0 }
    }

    pub(crate) fn exec_all(&mut self, stmts: &[Stmt], scope: ScopeId) {
        for stmt in stmts {
            self.exec_stmt(stmt, scope);
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: ScopeId) {
        match stmt {
            Stmt::CanvasSize { width, height } => {
                let w = self.eval_expr(width, scope).to_number();
                let h = self.eval_expr(height, scope).to_number();
                self.state.canvas = (w, h);
                self.state.scopes.define(GLOBAL, "width", Value::Num(w));
                self.state.scopes.define(GLOBAL, "height", Value::Num(h));
            }

            Stmt::FnDef(def) => {
                self.state
                    .functions
                    .insert(def.name.clone(), std::rc::Rc::new(def.clone()));
            }

            Stmt::Assign { name, indices, value } => {
                let value = self.eval_expr(value, scope);
                if indices.is_empty() {
                    self.state.scopes.set(scope, name, value);
                } else {
                    self.assign_indexed(name, indices, value, scope);
                }
            }

            Stmt::LoopFor { var, count, body } => {
                // count is read once at entry; NaN and negatives skip the
                // loop entirely rather than erroring
                let count = self.eval_expr(count, scope).to_number();
                let n = if count.is_nan() || count < 0.0 { 0 } else { count as usize };

                // one child scope for the whole loop, so variables created
                // inside persist across iterations
                let mark = self.state.scopes.mark();
                let inner = self.state.scopes.child(scope);
                for i in 0..n {
                    if let Some(var) = var {
                        self.state.scopes.define(inner, var, Value::Num(i as f64));
                    }
                    self.exec_all(body, inner);
                }
                self.state.scopes.release(mark);
            }

            // A condition that never turns false blocks the frame; that is
            // the language's contract, not something to paper over here.
            Stmt::LoopWhile { condition, body } => {
                let mark = self.state.scopes.mark();
                let inner = self.state.scopes.child(scope);
                while self.eval_expr(condition, inner).truthy() {
                    self.exec_all(body, inner);
                }
                self.state.scopes.release(mark);
            }

            // Branches share the surrounding scope: a variable assigned
            // inside an `if` is visible after it.
            Stmt::If { condition, then_block, else_block } => {
                if self.eval_expr(condition, scope).truthy() {
                    self.exec_all(then_block, scope);
                } else {
                    self.exec_all(else_block, scope);
                }
            }

            Stmt::Call { callee, args } => {
                self.eval_call(callee, args, scope);
            }

            // Only meaningful in the direct statement list of a function
            // body, where call_function intercepts it before we get here.
            Stmt::Return(_) => {}

            Stmt::Unknown(_) => {}
        }
    }

    // ─── Calls ───────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &str, args: &[Expr], scope: ScopeId) -> Value {
        let vals: Vec<Value> = args.iter().map(|a| self.eval_expr(a, scope)).collect();

        match callee {
            "print" => {
                let line = vals.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
                self.state.printed.push(line);
                Value::Undefined
            }
            "circle" => {
                let shape = Shape::Circle {
                    x: num_arg(&vals, 0),
                    y: num_arg(&vals, 1),
                    radius: num_arg(&vals, 2),
                };
                self.emit(shape);
                Value::Undefined
            }
            "rectangle" => {
                let shape = Shape::Rect {
                    x: num_arg(&vals, 0),
                    y: num_arg(&vals, 1),
                    width: num_arg(&vals, 2),
                    height: num_arg(&vals, 3),
                };
                self.emit(shape);
                Value::Undefined
            }
            "color" => {
                let color =
                    Color::rgb(channel(&vals, 0), channel(&vals, 1), channel(&vals, 2));
                self.state.push_color(color);
                Value::Undefined
            }
            "popColor" => {
                self.state.pop_color();
                Value::Undefined
            }
            "keyDown" => {
                let key = match vals.first() {
                    Some(Value::Str(s)) => s.clone(),
                    Some(v) => v.to_string(),
                    None => String::new(),
                };
                Value::Bool(self.state.pressed.contains(&key))
            }
            "random" => {
                let roll: f64 = self.state.rng.gen_range(0.0..1.0);
                match vals.first() {
                    Some(max) => Value::Num((roll * max.to_number()).floor()),
                    None => Value::Num(roll),
                }
            }
            "sin" => Value::Num(num_arg(&vals, 0).sin()),
            "cos" => Value::Num(num_arg(&vals, 0).cos()),
            "floor" => Value::Num(num_arg(&vals, 0).floor()),
            "abs" => Value::Num(num_arg(&vals, 0).abs()),

            _ => self.call_function(callee, vals, scope),
        }
    }

    /// Invoke a script-defined function. Arguments were already evaluated in
    /// the caller's scope; the body runs in a fresh child of that scope, so
    /// free names resolve up through the call site.
    ///
    /// `return` short-circuits only from the body's direct statement list;
    /// a `return` nested inside a loop or branch sub-list is inert there.
    pub(crate) fn call_function(&mut self, name: &str, args: Vec<Value>, scope: ScopeId) -> Value {
        let Some(def) = self.state.functions.get(name).cloned() else {
            self.state.report(Diagnostic::UndefinedFunction(name.to_string()));
            return Value::Undefined;
        };

        if self.depth >= MAX_CALL_DEPTH {
            self.state
                .report(Diagnostic::CallDepthExceeded(MAX_CALL_DEPTH, name.to_string()));
            return Value::Undefined;
        }

        let mark = self.state.scopes.mark();
        let inner = self.state.scopes.child(scope);
        // Extra arguments are dropped, missing parameters bind undefined.
        let mut args = args.into_iter();
        for param in &def.params {
            let value = args.next().unwrap_or(Value::Undefined);
            self.state.scopes.define(inner, param, value);
        }

        self.depth += 1;
        let mut result = Value::Undefined;
        for stmt in &def.body {
            if let Stmt::Return(expr) = stmt {
                if let Some(expr) = expr {
                    result = self.eval_expr(expr, inner);
                }
                break;
            }
            self.exec_stmt(stmt, inner);
        }
        self.depth -= 1;
        self.state.scopes.release(mark);

        result
    }

    fn emit(&mut self, shape: Shape) {
        let color = self.state.current_color();
        self.state.commands.push(DrawCommand { shape, color });
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    pub(crate) fn eval_expr(&mut self, expr: &Expr, scope: ScopeId) -> Value {
        match expr {
            Expr::Num(n) => Value::Num(*n),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Bool(b) => Value::Bool(*b),

            Expr::Ident(name) => match self.state.scopes.get(scope, name) {
                Some(value) => value,
                None => {
                    self.state.report(Diagnostic::UndefinedVariable(name.clone()));
                    Value::Undefined
                }
            },

            Expr::BinOp { left, op, right } => self.eval_binop(left, *op, right, scope),

            Expr::UnOp { op, operand } => {
                let value = self.eval_expr(operand, scope);
                match op {
                    UnOp::Neg => Value::Num(-value.to_number()),
                    UnOp::Not => Value::Bool(!value.truthy()),
                }
            }

            Expr::Call { callee, args } => self.eval_call(callee, args, scope),

            Expr::Index { target, index } => {
                let target = self.eval_expr(target, scope);
                let index = self.eval_expr(index, scope).to_number();
                match target {
                    Value::List(items) => {
                        // out-of-range reads are silently undefined
                        if index.is_finite() && index >= 0.0 {
                            items
                                .borrow()
                                .get(index as usize)
                                .cloned()
                                .unwrap_or(Value::Undefined)
                        } else {
                            Value::Undefined
                        }
                    }
                    other => {
                        self.state.report(Diagnostic::NotIndexable(other.type_name()));
                        Value::Undefined
                    }
                }
            }

            Expr::List(items) => {
                let items = items.iter().map(|e| self.eval_expr(e, scope)).collect();
                Value::list(items)
            }

            Expr::Unparsed(text) => {
                self.state.report(Diagnostic::ExpressionFailed(text.clone()));
                Value::Undefined
            }
        }
    }

    fn eval_binop(&mut self, left: &Expr, op: BinOp, right: &Expr, scope: ScopeId) -> Value {
        // short-circuit forms first
        match op {
            BinOp::And => {
                let l = self.eval_expr(left, scope);
                if !l.truthy() {
                    return Value::Bool(false);
                }
                return Value::Bool(self.eval_expr(right, scope).truthy());
            }
            BinOp::Or => {
                let l = self.eval_expr(left, scope);
                if l.truthy() {
                    return Value::Bool(true);
                }
                return Value::Bool(self.eval_expr(right, scope).truthy());
            }
            _ => {}
        }

        let l = self.eval_expr(left, scope);
        let r = self.eval_expr(right, scope);

        match op {
            BinOp::Add => {
                // `+` concatenates as soon as either side is a string
                if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
                    Value::Str(format!("{l}{r}"))
                } else {
                    Value::Num(l.to_number() + r.to_number())
                }
            }
            BinOp::Sub => Value::Num(l.to_number() - r.to_number()),
            BinOp::Mul => Value::Num(l.to_number() * r.to_number()),
            BinOp::Div => Value::Num(l.to_number() / r.to_number()),
            BinOp::Mod => Value::Num(l.to_number() % r.to_number()),

            BinOp::Eq => Value::Bool(values_equal(&l, &r)),
            BinOp::NotEq => Value::Bool(!values_equal(&l, &r)),

            BinOp::Lt => Value::Bool(l.to_number() < r.to_number()),
            BinOp::LtEq => Value::Bool(l.to_number() <= r.to_number()),
            BinOp::Gt => Value::Bool(l.to_number() > r.to_number()),
            BinOp::GtEq => Value::Bool(l.to_number() >= r.to_number()),

            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    /// `name[i][j]... = value`. Intermediate indices must land on existing
    /// list elements; the final index may point past the end, in which case
    /// the list grows with `undefined` padding.
    fn assign_indexed(&mut self, name: &str, indices: &[Expr], value: Value, scope: ScopeId) {
        // Evaluate every index up front: index expressions may themselves
        // call functions, and we must not hold a list borrow across that.
        let idx_vals: Vec<f64> = indices
            .iter()
            .map(|e| self.eval_expr(e, scope).to_number())
            .collect();
        let Some((last, path)) = idx_vals.split_last() else {
            return;
        };

        let Some(mut target) = self.state.scopes.get(scope, name) else {
            self.state.report(Diagnostic::UndefinedVariable(name.to_string()));
            return;
        };

        for idx in path {
            let items = match target {
                Value::List(items) => items,
                other => {
                    self.state.report(Diagnostic::NotIndexable(other.type_name()));
                    return;
                }
            };
            let next = if idx.is_finite() && *idx >= 0.0 {
                items.borrow().get(*idx as usize).cloned()
            } else {
                None
            };
            // a missing element surfaces as "cannot index undefined" below
            target = next.unwrap_or(Value::Undefined);
        }

        let items = match target {
            Value::List(items) => items,
            other => {
                self.state.report(Diagnostic::NotIndexable(other.type_name()));
                return;
            }
        };
        if !last.is_finite() || *last < 0.0 {
            self.state.report(Diagnostic::BadIndex(Value::Num(*last).to_string()));
            return;
        }
        let i = *last as usize;
        let mut items = items.borrow_mut();
        if i >= items.len() {
            items.resize(i + 1, Value::Undefined);
        }
        items[i] = value;
    }
}

fn num_arg(vals: &[Value], i: usize) -> f64 {
    vals.get(i).map(Value::to_number).unwrap_or(f64::NAN)
}

/// Color channel coercion: NaN → 0, everything else rounded and clamped.
fn channel(vals: &[Value], i: usize) -> u8 {
    let n = num_arg(vals, i);
    if n.is_nan() { 0 } else { n.round().clamp(0.0, 255.0) as u8 }
}

/// Equality used by `==`/`!=`. Strings compare as text, lists structurally;
/// any mix involving a number or boolean compares numerically (so NaN never
/// equals anything), and undefined only equals undefined.
fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
        (Value::Undefined, Value::Undefined) => true,
        (Value::Undefined, _) | (_, Value::Undefined) => false,
        _ => l.to_number() == r.to_number(),
    }
}
