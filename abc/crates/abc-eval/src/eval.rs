//! Tree-walking evaluator: `eval(node, env) -> (value, error)` from the
//! component design, threaded through Rust as `Result<Value, Signal>` so
//! `?` does the unwinding. Execution is strictly sequential; nothing here
//! suspends.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use abc_ast::{BinOp, Expr, ExprKind, FieldDecl, Program, Stmt, StmtKind, UnOp};
use abc_util::Symbol;
use indexmap::IndexMap;

use crate::builtins;
use crate::env::{Env, FrameId};
use crate::error::EvalError;
use crate::signal::{EvalResult, Signal};
use crate::value::{deep_copy, value_eq, ErrorValue, FieldSpec, FunctionValue, MethodValue, NumTag, StructDef, StructInstance, Value};

pub struct Evaluator {
    env: Env,
    call_stack: Vec<String>,
    output: Box<dyn Write>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(output: Box<dyn Write>) -> Self {
        let mut env = Env::new();
        let root = env.root();
        builtins::install(&mut env, root);
        Self { env, call_stack: vec!["<main>".to_string()], output }
    }

    /// Evaluates every top-level statement against the root frame.
    pub fn run(&mut self, program: &Program) -> Result<(), ErrorValue> {
        let root = self.env.root();
        match self.exec_block(&program.statements, root) {
            Ok(()) => Ok(()),
            Err(Signal::Return(_)) => Ok(()),
            Err(Signal::Break) => Err(ErrorValue {
                message: "break outside of loop".to_string(),
                type_name: "RuntimeError".to_string(),
                call_stack: self.call_stack.clone(),
            }),
            Err(Signal::Raised(e)) => Err(e),
        }
    }

    fn raise(&self, err: EvalError) -> Signal {
        Signal::Raised(ErrorValue {
            message: err.to_string(),
            type_name: err.type_name().to_string(),
            call_stack: self.call_stack.clone(),
        })
    }

    /// Builds an "undefined X" error, appending a Levenshtein-based "did
    /// you mean" suggestion when one of the names visible from `frame` is
    /// close enough.
    fn undefined(&self, kind: &str, name: Symbol, frame: FrameId) -> Signal {
        let visible = self.env.names_visible(frame);
        let candidates: Vec<&str> = visible.iter().map(|s| s.as_str()).collect();
        let message = match abc_util::suggest(name.as_str(), candidates) {
            Some(close) => format!("undefined {kind} '{name}' (did you mean '{close}'?)"),
            None => format!("undefined {kind} '{name}'"),
        };
        self.raise(EvalError::Runtime(message))
    }

    // -- blocks / statements -------------------------------------------------

    fn exec_block(&mut self, stmts: &[Stmt], frame: FrameId) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt, frame)?;
        }
        Ok(())
    }

    /// Runs `body` in a fresh child of `frame`, always killing that child
    /// scope on the way out — this is how if/loop/try bodies stay isolated
    /// from the enclosing scope (§8's scope-isolation property).
    fn exec_scoped(&mut self, body: &[Stmt], frame: FrameId) -> EvalResult<()> {
        let child = self.env.new_child(frame);
        let result = self.exec_block(body, child);
        self.env.kill(child);
        result
    }

    fn eval_condition(&mut self, expr: &Expr, frame: FrameId) -> EvalResult<bool> {
        let raw = self.eval_expr(expr, frame)?;
        let raw = self.deref(raw)?;
        match raw {
            Value::Bool(b) => Ok(b),
            other => Err(self.raise(EvalError::Type(format!("condition must be boolean, got {}", other.type_name())))),
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt, frame: FrameId) -> EvalResult<()> {
        match &stmt.kind {
            StmtKind::VariableDecl { name, is_constant, value } => {
                let v = self.eval_expr(value, frame)?;
                self.env.define(frame, *name, v, *is_constant).map_err(|e| self.raise(EvalError::Runtime(e)))
            }
            StmtKind::TypedVariableDecl { name, type_name, is_constant, value } => {
                let raw = self.eval_expr(value, frame)?;
                let raw = self.deref(raw)?;
                let typed = self.cast(raw, *type_name)?;
                self.env.define(frame, *name, typed, *is_constant).map_err(|e| self.raise(EvalError::Runtime(e)))
            }
            StmtKind::Assignment { name, value } => {
                let v = self.eval_expr(value, frame)?;
                self.env.set(frame, *name, v).map_err(|e| self.raise(EvalError::Runtime(e)))
            }
            StmtKind::IndexAssignment { list_name, index, value } => self.exec_index_assignment(*list_name, index, value, frame),
            StmtKind::FieldAssignment { object_name, field, value } => self.exec_field_assignment(*object_name, *field, value, frame),
            StmtKind::FunctionDecl { name, params, body } => {
                let func = Rc::new(FunctionValue {
                    name: *name,
                    params: params.clone(),
                    body: Rc::from(body.clone().into_boxed_slice()),
                    closure_frame: frame,
                });
                self.env.define_function(frame, *name, func);
                Ok(())
            }
            StmtKind::StructDecl { name, fields, methods } => {
                self.exec_struct_decl(*name, fields, methods, frame);
                Ok(())
            }
            StmtKind::CallStatement { call } => self.eval_expr(call, frame).map(|_| ()),
            StmtKind::IfStatement { condition, then_branch, elseif_parts, else_branch } => {
                if self.eval_condition(condition, frame)? {
                    return self.exec_scoped(then_branch, frame);
                }
                for branch in elseif_parts {
                    if self.eval_condition(&branch.condition, frame)? {
                        return self.exec_scoped(&branch.then_branch, frame);
                    }
                }
                if let Some(body) = else_branch {
                    return self.exec_scoped(body, frame);
                }
                Ok(())
            }
            StmtKind::WhileLoop { condition, body } => {
                while self.eval_condition(condition, frame)? {
                    match self.exec_scoped(body, frame) {
                        Ok(()) => {}
                        Err(Signal::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            StmtKind::ForLoop { count, body } => {
                let raw = self.eval_expr(count, frame)?;
                let raw = self.deref(raw)?;
                let n = match raw {
                    Value::Number { value, .. } => value,
                    other => return Err(self.raise(EvalError::Type(format!("repeat count must be a number, got {}", other.type_name())))),
                };
                let n = if n.is_sign_negative() { 0 } else { n.floor() as i64 };
                for _ in 0..n {
                    match self.exec_scoped(body, frame) {
                        Ok(()) => {}
                        Err(Signal::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            StmtKind::ForEachLoop { item_name, list, body } => {
                let raw = self.eval_expr(list, frame)?;
                let raw = self.deref(raw)?;
                let items = match raw {
                    Value::List(items) => items.borrow().clone(),
                    other => return Err(self.raise(EvalError::Type(format!("for-each requires a list, got {}", other.type_name())))),
                };
                for item in items {
                    let child = self.env.new_child(frame);
                    self.env.define_raw(child, *item_name, item);
                    let result = self.exec_block(body, child);
                    self.env.kill(child);
                    match result {
                        Ok(()) => {}
                        Err(Signal::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            StmtKind::OutputStatement { values, trailing_newline } => {
                let mut rendered = Vec::with_capacity(values.len());
                for v in values {
                    let raw = self.eval_expr(v, frame)?;
                    let raw = self.deref(raw)?;
                    rendered.push(raw.stringify());
                }
                let text = rendered.join(" ");
                if *trailing_newline {
                    let _ = writeln!(self.output, "{text}");
                } else {
                    let _ = write!(self.output, "{text}");
                }
                Ok(())
            }
            StmtKind::ReturnStatement { value } => {
                let v = self.eval_expr(value, frame)?;
                Err(Signal::Return(v))
            }
            StmtKind::BreakStatement => Err(Signal::Break),
            StmtKind::ToggleStatement { name } => {
                let raw = self.env.get(frame, *name).ok_or_else(|| self.undefined("variable", *name, frame))?;
                match raw {
                    Value::Bool(b) => self
                        .env
                        .set(frame, *name, Value::Bool(!b))
                        .map_err(|e| self.raise(EvalError::Runtime(e))),
                    other => Err(self.raise(EvalError::Runtime(format!("'{name}' is not a boolean ({})", other.type_name())))),
                }
            }
            StmtKind::SwapStatement { name1, name2 } => {
                let v1 = self.env.get(frame, *name1).ok_or_else(|| self.undefined("variable", *name1, frame))?;
                let v2 = self.env.get(frame, *name2).ok_or_else(|| self.undefined("variable", *name2, frame))?;
                self.env.set(frame, *name1, v2).map_err(|e| self.raise(EvalError::Runtime(e)))?;
                self.env.set(frame, *name2, v1).map_err(|e| self.raise(EvalError::Runtime(e)))
            }
            StmtKind::TryStatement { try_body, error_body, finally_body } => self.exec_try(try_body, error_body, finally_body, frame),
            StmtKind::RaiseStatement { message, error_type } => {
                let raw = self.eval_expr(message, frame)?;
                let raw = self.deref(raw)?;
                Err(Signal::Raised(ErrorValue {
                    message: raw.stringify(),
                    type_name: error_type.to_string(),
                    call_stack: self.call_stack.clone(),
                }))
            }
            StmtKind::ImportStatement { path } => self.exec_import(*path, frame),
        }
    }

    fn exec_index_assignment(&mut self, list_name: Symbol, index: &Expr, value: &Expr, frame: FrameId) -> EvalResult<()> {
        let list_val = self.env.get(frame, list_name).ok_or_else(|| self.undefined("variable", list_name, frame))?;
        let list_val = self.deref(list_val)?;
        let backing = match list_val {
            Value::List(b) => b,
            other => return Err(self.raise(EvalError::Type(format!("'{list_name}' is not a list ({})", other.type_name())))),
        };
        let idx_raw = self.eval_expr(index, frame)?;
        let idx_raw = self.deref(idx_raw)?;
        let idx = match idx_raw {
            Value::Number { value, .. } if value >= 0.0 => value as usize,
            other => return Err(self.raise(EvalError::Runtime(format!("index must be a non-negative number, got {}", other.type_name())))),
        };
        let new_val = self.eval_expr(value, frame)?;
        let mut items = backing.borrow_mut();
        if idx >= items.len() {
            return Err(self.raise(EvalError::Runtime(format!("index {idx} out of bounds for list of length {}", items.len()))));
        }
        items[idx] = new_val;
        Ok(())
    }

    fn exec_field_assignment(&mut self, object_name: Symbol, field: Symbol, value: &Expr, frame: FrameId) -> EvalResult<()> {
        let obj_val = self.env.get(frame, object_name).ok_or_else(|| self.undefined("variable", object_name, frame))?;
        let obj_val = self.deref(obj_val)?;
        let inst = match obj_val {
            Value::Struct(inst) => inst,
            other => return Err(self.raise(EvalError::Type(format!("'{object_name}' is not a struct ({})", other.type_name())))),
        };
        if !inst.borrow().fields.contains_key(&field) {
            return Err(self.raise(EvalError::Runtime(format!("'{object_name}' has no field '{field}'"))));
        }
        let new_val = self.eval_expr(value, frame)?;
        inst.borrow_mut().fields.insert(field, new_val);
        Ok(())
    }

    fn exec_struct_decl(&mut self, name: Symbol, fields: &[FieldDecl], methods: &[abc_ast::MethodDecl], frame: FrameId) {
        let field_specs: Vec<FieldSpec> = fields
            .iter()
            .map(|f| FieldSpec { name: f.name, type_name: f.type_name, unsigned: f.unsigned, default: f.default.clone() })
            .collect();
        let mut method_map = rustc_hash::FxHashMap::default();
        for m in methods {
            method_map.insert(
                m.name,
                MethodValue {
                    name: m.name,
                    params: m.params.clone(),
                    body: Rc::from(m.body.clone().into_boxed_slice()),
                    closure_frame: frame,
                },
            );
        }
        let def = Rc::new(StructDef { name, fields: field_specs, methods: method_map, closure_frame: frame });
        self.env.define_struct(frame, name, def);
    }

    fn exec_try(&mut self, try_body: &[Stmt], error_body: &Option<Vec<Stmt>>, finally_body: &Option<Vec<Stmt>>, frame: FrameId) -> EvalResult<()> {
        // The try body itself runs directly in the enclosing scope, not a
        // child — only the on-error body gets its own frame (for `error`).
        let mut pending: Option<Signal> = None;
        match self.exec_block(try_body, frame) {
            Ok(()) => {}
            Err(Signal::Raised(caught)) => match error_body {
                Some(body) => {
                    let child = self.env.new_child(frame);
                    self.env.define_raw(child, Symbol::intern("error"), Value::Error(Rc::new(caught)));
                    if let Err(sig) = self.exec_block(body, child) {
                        pending = Some(sig);
                    }
                    self.env.kill(child);
                }
                None => pending = Some(Signal::Raised(caught)),
            },
            Err(other) => pending = Some(other),
        }

        if let Some(body) = finally_body {
            if let Err(finally_sig) = self.exec_block(body, frame) {
                // "if finally raises, that error supersedes any prior"
                return Err(finally_sig);
            }
        }

        match pending {
            Some(sig) => Err(sig),
            None => Ok(()),
        }
    }

    fn exec_import(&mut self, path: Symbol, frame: FrameId) -> EvalResult<()> {
        let text = std::fs::read_to_string(path.as_str())
            .map_err(|e| self.raise(EvalError::Import(format!("cannot read '{path}': {e}"))))?;
        let program = abc_par::parse_source(&text).map_err(|e| self.raise(EvalError::Import(format!("cannot parse '{path}': {e}"))))?;
        self.exec_block(&program.statements, frame)
    }

    // -- expressions ----------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr, frame: FrameId) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::number(*n)),
            ExprKind::StringLit(s) => Ok(Value::string(s.as_str())),
            ExprKind::BooleanLit(b) => Ok(Value::Bool(*b)),
            ExprKind::ListLit(elems) => {
                let mut items = Vec::with_capacity(elems.len());
                for e in elems {
                    let raw = self.eval_expr(e, frame)?;
                    items.push(self.deref(raw)?);
                }
                Ok(Value::list(items))
            }
            // Identifiers pass through whatever is stored verbatim — a
            // variable holding a Reference stays a Reference until an
            // operator actually consumes its content.
            ExprKind::Identifier(name) => self.env.get(frame, *name).ok_or_else(|| self.undefined("variable", *name, frame)),
            ExprKind::BinaryExpr { left, op, right } => {
                let l = self.eval_expr(left, frame)?;
                let l = self.deref(l)?;
                let r = self.eval_expr(right, frame)?;
                let r = self.deref(r)?;
                self.binary_op(*op, l, r)
            }
            ExprKind::UnaryExpr { op, right } => {
                let raw = self.eval_expr(right, frame)?;
                let raw = self.deref(raw)?;
                match (op, &raw) {
                    (UnOp::Neg, Value::Number { value, .. }) => Ok(Value::number(-value)),
                    (UnOp::Neg, other) => Err(self.raise(EvalError::Type(format!("cannot negate {}", other.type_name())))),
                }
            }
            ExprKind::FunctionCall { name, args } => self.call_function(*name, args, frame),
            ExprKind::MethodCall { object, method, args } => self.call_method(object, *method, args, frame),
            ExprKind::IndexExpr { list, index } => self.eval_index(list, index, frame),
            ExprKind::LengthExpr { value } => {
                let raw = self.eval_expr(value, frame)?;
                let raw = self.deref(raw)?;
                match raw {
                    Value::List(items) => Ok(Value::number(items.borrow().len() as f64)),
                    Value::String(s) => Ok(Value::number(s.len() as f64)),
                    other => Err(self.raise(EvalError::Type(format!("length of non-list/string value ({})", other.type_name())))),
                }
            }
            ExprKind::LocationExpr { name } => self
                .env
                .location_of(frame, *name)
                .map(Value::string)
                .ok_or_else(|| self.undefined("variable", *name, frame)),
            ExprKind::StructInstantiation { struct_name, field_values } => self.eval_struct_instantiation(*struct_name, field_values, frame),
            ExprKind::FieldAccess { object, field } => self.eval_field_access(object, *field, frame),
            // Not dereferenced: "reference" is itself a reportable type.
            ExprKind::TypeExpr { value } => {
                let raw = self.eval_expr(value, frame)?;
                Ok(Value::string(raw.type_name()))
            }
            ExprKind::CastExpr { value, type_name } => {
                let raw = self.eval_expr(value, frame)?;
                let raw = self.deref(raw)?;
                self.cast(raw, *type_name)
            }
            ExprKind::ReferenceExpr { name } => {
                let owner = self.env.owning_frame(frame, *name).ok_or_else(|| self.undefined("variable", *name, frame))?;
                Ok(Value::Reference { frame: owner, name: *name, generation: self.env.generation_of(owner) })
            }
            ExprKind::CopyExpr { value } => {
                let raw = self.eval_expr(value, frame)?;
                let raw = self.deref(raw)?;
                Ok(deep_copy(&raw))
            }
        }
    }

    /// Chases `Reference` values to the value they currently name,
    /// rejecting a reference whose target frame died since capture
    /// (REDESIGN note: generational arena, not refcounting).
    fn deref(&self, value: Value) -> EvalResult<Value> {
        let mut current = value;
        let mut hops = 0;
        loop {
            match current {
                Value::Reference { frame, name, generation } => {
                    if !self.env.is_live(frame, generation) {
                        return Err(self.raise(EvalError::Runtime("dangling reference".to_string())));
                    }
                    current = self.env.get(frame, name).ok_or_else(|| self.undefined("variable", name, frame))?;
                    hops += 1;
                    if hops > 64 {
                        return Err(self.raise(EvalError::Runtime("reference cycle detected".to_string())));
                    }
                }
                other => return Ok(other),
            }
        }
    }

    fn eval_index(&mut self, list: &Expr, index: &Expr, frame: FrameId) -> EvalResult<Value> {
        let list_raw = self.eval_expr(list, frame)?;
        let list_raw = self.deref(list_raw)?;
        let backing = match list_raw {
            Value::List(b) => b,
            other => return Err(self.raise(EvalError::Type(format!("index on non-list value ({})", other.type_name())))),
        };
        let idx_raw = self.eval_expr(index, frame)?;
        let idx_raw = self.deref(idx_raw)?;
        let idx = match idx_raw {
            Value::Number { value, .. } if value >= 0.0 => value as usize,
            other => return Err(self.raise(EvalError::Runtime(format!("index must be a non-negative number, got {}", other.type_name())))),
        };
        let items = backing.borrow();
        items
            .get(idx)
            .cloned()
            .ok_or_else(|| self.raise(EvalError::Runtime(format!("index {idx} out of bounds for list of length {}", items.len()))))
    }

    fn eval_struct_instantiation(&mut self, struct_name: Symbol, field_values: &[Expr], frame: FrameId) -> EvalResult<Value> {
        let def = self.env.get_struct(frame, struct_name).ok_or_else(|| self.undefined("struct", struct_name, frame))?;
        if field_values.len() > def.fields.len() {
            return Err(self.raise(EvalError::Runtime(format!(
                "'{struct_name}' takes at most {} field value(s), got {}",
                def.fields.len(),
                field_values.len()
            ))));
        }
        let mut fields = IndexMap::new();
        for (i, spec) in def.fields.iter().enumerate() {
            let value = if i < field_values.len() {
                let raw = self.eval_expr(&field_values[i], frame)?;
                self.deref(raw)?
            } else if let Some(default_expr) = &spec.default {
                let raw = self.eval_expr(default_expr, def.closure_frame)?;
                self.deref(raw)?
            } else {
                Value::Null
            };
            fields.insert(spec.name, value);
        }
        Ok(Value::Struct(Rc::new(RefCell::new(StructInstance { def: def.clone(), fields }))))
    }

    fn eval_field_access(&mut self, object: &Expr, field: Symbol, frame: FrameId) -> EvalResult<Value> {
        let raw = self.eval_expr(object, frame)?;
        let raw = self.deref(raw)?;
        match raw {
            Value::Struct(inst) => {
                let inst = inst.borrow();
                inst.fields
                    .get(&field)
                    .cloned()
                    .ok_or_else(|| self.raise(EvalError::Runtime(format!("no field '{field}' on '{}'", inst.def.name))))
            }
            Value::Error(e) => match field.as_str() {
                "message" => Ok(Value::string(e.message.clone())),
                "type" => Ok(Value::string(e.type_name.clone())),
                "call_stack" => Ok(Value::list(e.call_stack.iter().cloned().map(Value::string).collect())),
                other => Err(self.raise(EvalError::Runtime(format!("no field '{other}' on error")))),
            },
            other => Err(self.raise(EvalError::Type(format!("field access on non-struct value ({})", other.type_name())))),
        }
    }

    fn call_function(&mut self, name: Symbol, args: &[Expr], frame: FrameId) -> EvalResult<Value> {
        let func = self.env.get_function(frame, name).ok_or_else(|| self.undefined("function", name, frame))?;
        if func.params.len() != args.len() {
            return Err(self.raise(EvalError::Runtime(format!(
                "'{name}' expects {} argument(s), got {}",
                func.params.len(),
                args.len()
            ))));
        }
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expr(a, frame)?);
        }

        if func.body.is_empty() {
            let mut concrete = Vec::with_capacity(values.len());
            for v in values {
                concrete.push(self.deref(v)?);
            }
            return builtins::dispatch(name.as_str(), concrete).map_err(|e| self.raise(e));
        }

        let _span = tracing::debug_span!("call", function = %name).entered();
        let call_frame = self.env.new_child(func.closure_frame);
        for (param, value) in func.params.iter().zip(values) {
            self.env.define_raw(call_frame, *param, value);
        }
        self.call_stack.push(format!("{name}(...)"));
        let result = self.exec_block(&func.body, call_frame);
        self.call_stack.pop();
        self.env.kill(call_frame);
        match result {
            Ok(()) => Ok(Value::Null),
            Err(Signal::Return(v)) => Ok(v),
            Err(Signal::Break) => Err(self.raise(EvalError::Runtime("break outside of loop".to_string()))),
            Err(other) => Err(other),
        }
    }

    fn call_method(&mut self, object: &Expr, method: Symbol, args: &[Expr], frame: FrameId) -> EvalResult<Value> {
        let obj_raw = self.eval_expr(object, frame)?;
        let obj_val = self.deref(obj_raw)?;
        let inst_rc = match obj_val {
            Value::Struct(inst) => inst,
            other => return Err(self.raise(EvalError::Type(format!("method call on non-struct value ({})", other.type_name())))),
        };
        let def = inst_rc.borrow().def.clone();
        let m = def.methods.get(&method).cloned().ok_or_else(|| self.undefined("method", method, frame))?;
        if m.params.len() != args.len() {
            return Err(self.raise(EvalError::Runtime(format!(
                "'{method}' expects {} argument(s), got {}",
                m.params.len(),
                args.len()
            ))));
        }
        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            arg_values.push(self.eval_expr(a, frame)?);
        }

        let _span = tracing::debug_span!("call", method = %method).entered();
        let call_frame = self.env.new_child(m.closure_frame);
        let field_snapshot: Vec<(Symbol, Value)> = inst_rc.borrow().fields.iter().map(|(k, v)| (*k, v.clone())).collect();
        for (name, value) in field_snapshot {
            self.env.define_raw(call_frame, name, value);
        }
        for (param, value) in m.params.iter().zip(arg_values) {
            self.env.define_raw(call_frame, *param, value);
        }

        self.call_stack.push(format!("{method}(...)"));
        let result = self.exec_block(&m.body, call_frame);
        self.call_stack.pop();

        let outcome = match result {
            Ok(()) => Ok(Value::Null),
            Err(Signal::Return(v)) => Ok(v),
            Err(Signal::Break) => Err(self.raise(EvalError::Runtime("break outside of loop".to_string()))),
            Err(other) => Err(other),
        };

        if outcome.is_ok() {
            let mut inst = inst_rc.borrow_mut();
            let field_names: Vec<Symbol> = inst.fields.keys().copied().collect();
            for name in field_names {
                if let Some(v) = self.env.get_local(call_frame, name) {
                    inst.fields.insert(name, v);
                }
            }
        }
        self.env.kill(call_frame);
        outcome
    }

    // -- operators --------------------------------------------------------

    fn binary_op(&self, op: BinOp, l: Value, r: Value) -> EvalResult<Value> {
        match op {
            BinOp::Add => self.add(l, r),
            BinOp::Sub => self.arith(l, r, "subtract", |a, b| a - b),
            BinOp::Mul => self.mul(l, r),
            BinOp::Div => self.div(l, r),
            BinOp::Mod => self.modulus(l, r),
            BinOp::Eq => Ok(Value::Bool(value_eq(&l, &r))),
            BinOp::Ne => Ok(Value::Bool(!value_eq(&l, &r))),
            BinOp::Lt => self.compare(l, r, |a, b| a < b),
            BinOp::Gt => self.compare(l, r, |a, b| a > b),
            BinOp::Le => self.compare(l, r, |a, b| a <= b),
            BinOp::Ge => self.compare(l, r, |a, b| a >= b),
        }
    }

    fn coerce_number(&self, v: &Value) -> Option<f64> {
        match v {
            Value::Number { value, .. } => Some(*value),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    fn compare(&self, l: Value, r: Value, f: impl Fn(f64, f64) -> bool) -> EvalResult<Value> {
        let a = self
            .coerce_number(&l)
            .ok_or_else(|| self.raise(EvalError::Runtime(format!("cannot compare {} as a number", l.type_name()))))?;
        let b = self
            .coerce_number(&r)
            .ok_or_else(|| self.raise(EvalError::Runtime(format!("cannot compare {} as a number", r.type_name()))))?;
        Ok(Value::Bool(f(a, b)))
    }

    fn arith(&self, l: Value, r: Value, name: &str, f: impl Fn(f64, f64) -> f64) -> EvalResult<Value> {
        match (&l, &r) {
            (Value::Number { value: a, .. }, Value::Number { value: b, .. }) => Ok(Value::number(f(*a, *b))),
            _ => Err(self.raise(EvalError::Type(format!("cannot {name} {} and {}", l.type_name(), r.type_name())))),
        }
    }

    fn add(&self, l: Value, r: Value) -> EvalResult<Value> {
        match (&l, &r) {
            (Value::Number { value: a, .. }, Value::Number { value: b, .. }) => Ok(Value::number(a + b)),
            (Value::Number { .. }, Value::String(_)) => Err(self.raise(EvalError::Type("mismatched types: number + string".to_string()))),
            (Value::String(_), _) => Ok(Value::string(format!("{}{}", l.stringify(), r.stringify()))),
            (Value::List(a), Value::List(b)) => {
                let mut out = a.borrow().clone();
                out.extend(b.borrow().iter().cloned());
                Ok(Value::list(out))
            }
            (Value::List(a), _) => {
                let mut out = a.borrow().clone();
                out.push(r);
                Ok(Value::list(out))
            }
            _ => Err(self.raise(EvalError::Type(format!("cannot add {} and {}", l.type_name(), r.type_name())))),
        }
    }

    fn mul(&self, l: Value, r: Value) -> EvalResult<Value> {
        match (&l, &r) {
            (Value::Number { value: a, .. }, Value::Number { value: b, .. }) => Ok(Value::number(a * b)),
            (Value::String(s), Value::Number { value, .. }) => Ok(Value::string(s.repeat(value.max(0.0) as usize))),
            (Value::Number { value, .. }, Value::String(s)) => Ok(Value::string(s.repeat(value.max(0.0) as usize))),
            _ => Err(self.raise(EvalError::Type(format!("cannot multiply {} and {}", l.type_name(), r.type_name())))),
        }
    }

    fn div(&self, l: Value, r: Value) -> EvalResult<Value> {
        match (&l, &r) {
            (Value::Number { value: a, .. }, Value::Number { value: b, .. }) => {
                if *b == 0.0 {
                    return Err(self.raise(EvalError::ZeroDivision));
                }
                Ok(Value::number(a / b))
            }
            _ => Err(self.raise(EvalError::Type(format!("cannot divide {} and {}", l.type_name(), r.type_name())))),
        }
    }

    fn modulus(&self, l: Value, r: Value) -> EvalResult<Value> {
        match (&l, &r) {
            (Value::Number { value: a, .. }, Value::Number { value: b, .. }) => {
                let bi = *b as i64;
                if bi == 0 {
                    return Err(self.raise(EvalError::ZeroDivision));
                }
                Ok(Value::number((*a as i64 % bi) as f64))
            }
            _ => Err(self.raise(EvalError::Type(format!("cannot compute remainder of {} and {}", l.type_name(), r.type_name())))),
        }
    }

    fn cast(&self, v: Value, type_name: Symbol) -> EvalResult<Value> {
        match type_name.as_str() {
            "i32" | "i64" | "u32" | "u64" | "f32" | "f64" => self.cast_numeric(v, type_name.as_str()),
            "string" => Ok(Value::string(v.stringify())),
            other => Err(self.raise(EvalError::Type(format!("unknown cast target '{other}'")))),
        }
    }

    fn cast_numeric(&self, v: Value, target: &str) -> EvalResult<Value> {
        let raw = match &v {
            Value::Number { value, .. } => *value,
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|_| self.raise(EvalError::Type(format!("cannot parse '{s}' as {target}"))))?,
            other => return Err(self.raise(EvalError::Type(format!("cannot cast {} to {target}", other.type_name())))),
        };
        let (tag, narrowed) = match target {
            "i32" => (NumTag::I32, raw.trunc()),
            "i64" => (NumTag::I64, raw.trunc()),
            "u32" | "u64" => {
                if raw < 0.0 {
                    return Err(self.raise(EvalError::Type(format!("cannot cast negative number to {target}"))));
                }
                (if target == "u32" { NumTag::U32 } else { NumTag::U64 }, raw.trunc())
            }
            "f32" => (NumTag::F32, raw as f32 as f64),
            "f64" => (NumTag::F64, raw),
            _ => unreachable!("numeric cast dispatch for {target}"),
        };
        Ok(Value::Number { value: narrowed, tag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_capturing(src: &str) -> (Result<(), ErrorValue>, String) {
        let program = abc_par::parse_source(src).expect("source should parse");
        let buf = Rc::new(RefCell::new(Vec::new()));
        struct SharedWriter(Rc<RefCell<Vec<u8>>>);
        impl Write for SharedWriter {
            fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
                self.0.borrow_mut().write(data)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut eval = Evaluator::with_writer(Box::new(SharedWriter(buf.clone())));
        let result = eval.run(&program);
        let text = String::from_utf8(buf.borrow().clone()).unwrap();
        (result, text)
    }

    #[test]
    fn output_prints_in_order() {
        let (result, text) = run_capturing("Print 1. Print 2. Print 3.");
        assert!(result.is_ok());
        assert_eq!(text, "1\n2\n3\n");
    }

    #[test]
    fn variable_scoping_isolated_from_if_branch() {
        let (result, text) = run_capturing(
            "Declare x to be 1. If x is equal to 1, then Declare x to be 99. Print x. thats it. Print x.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "99\n1\n");
    }

    #[test]
    fn constant_reassignment_is_a_runtime_error() {
        let (result, _) = run_capturing("Declare x to always be 5. Set x to be 6.");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().type_name, "RuntimeError");
    }

    #[test]
    fn function_call_and_return_value() {
        let (result, text) = run_capturing(
            "Declare function add that takes a and b and does the following: Return a + b. thats it. Print the result of calling add with 3 and 4.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "7\n");
    }

    #[test]
    fn reference_escaping_its_frame_is_dangling_once_dereferenced() {
        let (result, _) = run_capturing(
            "Declare function make_ref that takes n and does the following: Declare local to be n. Return a reference to local. thats it. Set r to be the result of calling make_ref with 5. Print r.",
        );
        let err = result.unwrap_err();
        assert_eq!(err.type_name, "RuntimeError");
        assert!(err.message.contains("dangling reference"));
    }

    #[test]
    fn reference_to_still_live_frame_dereferences_to_current_value() {
        let (result, text) = run_capturing(
            "Declare x to be 1. Declare r to be a reference to x. Set x to be 2. Print r.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "2\n");
    }

    #[test]
    fn break_stops_innermost_loop_only() {
        let (result, text) = run_capturing(
            "Declare i to be 0. repeat the following 5 times: Set i to be i + 1. If i is equal to 3, then Break. thats it. thats it. Print i.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "3\n");
    }

    #[test]
    fn division_by_zero_raises_zero_division_error() {
        let (result, _) = run_capturing("Print 1 / 0.");
        let err = result.unwrap_err();
        assert_eq!(err.type_name, "ZeroDivisionError");
    }

    #[test]
    fn try_on_error_catches_raised_error() {
        let (result, text) = run_capturing(
            "try doing the following: raise \"boom\" as MyErr. on error: Print \"caught\". thats it.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "caught\n");
    }

    #[test]
    fn finally_runs_even_when_error_propagates() {
        let (result, text) = run_capturing(
            "try doing the following: raise \"boom\" as MyErr. but finally: Print \"cleanup\". thats it.",
        );
        assert!(result.is_err());
        assert_eq!(text, "cleanup\n");
    }

    #[test]
    fn uncaught_user_error_type_name_is_preserved() {
        let (result, _) = run_capturing("raise \"boom\" as MyErr.");
        let err = result.unwrap_err();
        assert_eq!(err.type_name, "MyErr");
    }

    #[test]
    fn string_plus_number_stringifies() {
        let (result, text) = run_capturing("Print \"count: \" + 5.");
        assert!(result.is_ok());
        assert_eq!(text, "count: 5\n");
    }

    #[test]
    fn number_plus_string_is_a_type_error() {
        let (result, _) = run_capturing("Print 5 + \"x\".");
        let err = result.unwrap_err();
        assert_eq!(err.type_name, "TypeError");
    }

    #[test]
    fn list_append_via_plus_does_not_mutate_in_place() {
        let (result, text) = run_capturing(
            "Declare nums to be [1, 2]. Declare more to be nums + 3. Print nums. Print more.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "[1, 2]\n[1, 2, 3]\n");
    }

    #[test]
    fn struct_instantiation_uses_field_defaults() {
        let (result, text) = run_capturing(
            "Declare account as a structure with the following fields: balance is a number with 0 being the default. thats it. Declare acct to be a new instance of account. Print the balance of acct.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "0\n");
    }

    #[test]
    fn method_call_mutates_struct_field() {
        let (result, text) = run_capturing(
            "Declare account as a structure with the following fields: balance is a number with 0 being the default. let deposit to be a function that takes amount and does the following: Set balance to be balance + amount. thats it. thats it. Declare acct to be a new instance of account. Call acct's deposit with 10. Print the balance of acct.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "10\n");
    }

    #[test]
    fn type_of_reference_reports_reference_not_referent() {
        let (result, text) = run_capturing(
            "Declare x to be 5. Declare r to be a reference to x. Print the type of r.",
        );
        assert!(result.is_ok());
        assert_eq!(text, "reference\n");
    }

    #[test]
    fn cast_to_i32_truncates_toward_zero() {
        let eval = Evaluator::with_writer(Box::new(Vec::new()));
        let cast = eval.cast(Value::number(7.9), Symbol::intern("i32")).unwrap();
        assert!(matches!(cast, Value::Number { value, tag: NumTag::I32 } if value == 7.0));
    }

    #[test]
    fn cast_negative_to_unsigned_is_a_type_error() {
        let eval = Evaluator::with_writer(Box::new(Vec::new()));
        let err = eval.cast(Value::number(-1.0), Symbol::intern("u32")).unwrap_err();
        match err {
            Signal::Raised(e) => assert_eq!(e.type_name, "TypeError"),
            _ => panic!("expected Raised"),
        }
    }

    #[test]
    fn comparison_across_types_is_equal_to_is_false_not_an_error() {
        let (result, text) = run_capturing("Print 5 is equal to \"5\".");
        assert!(result.is_ok());
        assert_eq!(text, "false\n");
    }

    #[test]
    fn toggle_flips_boolean() {
        let (result, text) = run_capturing("Declare flag to be true. Toggle flag. Print flag.");
        assert!(result.is_ok());
        assert_eq!(text, "false\n");
    }

    #[test]
    fn undefined_variable_suggests_close_name() {
        let (result, _) = run_capturing("Declare counter to be 1. Print countr.");
        let err = result.unwrap_err();
        assert!(err.message.contains("did you mean"));
    }
}
