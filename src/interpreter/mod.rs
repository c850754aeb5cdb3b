// File: src/interpreter/mod.rs
//
// Tree-walking evaluator for CopyClean scripts. Walks the parsed statement
// list against a chain of lexically nested scopes, dispatching calls to
// reserved builtins, effect handlers, and user-defined functions in that
// order. Errors are values and unwind through `Result`; `break`, `continue`
// and `return` travel separately as `ExecFlow` so they can stop at the
// construct that owns them.

pub mod control_flow;
pub mod effects;
pub mod environment;
pub mod methods;
pub mod ops;
pub mod value;

pub use control_flow::ExecFlow;
pub use effects::{AlertResponse, Effects};
pub use environment::{EnvRef, Environment};
pub use value::{MatchValue, RegexValue, Value};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ast::{Expr, ExprKind, Operator, Param, Span, Stmt, Type};
use crate::errors::{Error, ErrorKind};

/// A user-defined function as stored in the registry. Bodies are cloned
/// out per call; they are small.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: Vec<Stmt>,
}

pub struct Interpreter {
    pub globals: EnvRef,
    functions: HashMap<String, FunctionDecl>,
    pub effects: Effects,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter { globals: Environment::new(), functions: HashMap::new(), effects: Effects::new() }
    }

    /// Redirect `print` output into `sink` instead of stdout.
    pub fn set_output(&mut self, sink: Arc<Mutex<Vec<u8>>>) {
        self.effects.console.set_output(sink);
    }

    /// Run a whole program against the root scope. A top-level `return`
    /// becomes the program's final value; falling off the end yields null.
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<Value, Box<Error>> {
        let globals = self.globals.clone();
        match self.eval_statements(stmts, &globals)? {
            ExecFlow::Return(value) => Ok(value),
            ExecFlow::None => Ok(Value::Null),
            ExecFlow::Break => Err(Error::new(ErrorKind::Syntax, "'break' outside of a loop")),
            ExecFlow::Continue => {
                Err(Error::new(ErrorKind::Syntax, "'continue' outside of a loop"))
            }
        }
    }

    /// Evaluate statements in order, stopping at the first error or
    /// non-`None` flow.
    fn eval_statements(&mut self, stmts: &[Stmt], env: &EnvRef) -> Result<ExecFlow, Box<Error>> {
        for stmt in stmts {
            let flow = self.eval_stmt(stmt, env)?;
            if flow != ExecFlow::None {
                return Ok(flow);
            }
        }
        Ok(ExecFlow::None)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> Result<ExecFlow, Box<Error>> {
        match stmt {
            Stmt::Assignment { name, expr } => {
                let value = self.eval_expr(expr, env)?;
                env.borrow_mut().assign(name, value);
                Ok(ExecFlow::None)
            }
            Stmt::VarDecl { name, ty, init } => {
                let value = match init {
                    Some(expr) => {
                        let value = self.eval_expr(expr, env)?;
                        if !value.matches_type(ty) {
                            return Err(Error::with_span(
                                ErrorKind::Type,
                                format!(
                                    "variable `{}` declared as {} but initialized with {}",
                                    name,
                                    ty,
                                    value.type_name()
                                ),
                                expr.span,
                            ));
                        }
                        value
                    }
                    None => Value::Null,
                };
                env.borrow_mut().declare(name, value);
                Ok(ExecFlow::None)
            }
            Stmt::If { condition, body, elif_clauses, else_body } => {
                if self.eval_expr(condition, env)?.is_truthy() {
                    let scope = Environment::with_parent(env.clone());
                    return self.eval_statements(body, &scope);
                }
                for (elif_cond, elif_body) in elif_clauses {
                    if self.eval_expr(elif_cond, env)?.is_truthy() {
                        let scope = Environment::with_parent(env.clone());
                        return self.eval_statements(elif_body, &scope);
                    }
                }
                let scope = Environment::with_parent(env.clone());
                self.eval_statements(else_body, &scope)
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition, env)?.is_truthy() {
                    let scope = Environment::with_parent(env.clone());
                    match self.eval_statements(body, &scope)? {
                        ExecFlow::None | ExecFlow::Continue => {}
                        ExecFlow::Break => break,
                        flow @ ExecFlow::Return(_) => return Ok(flow),
                    }
                }
                Ok(ExecFlow::None)
            }
            Stmt::Return(expr) => {
                let value = self.eval_expr(expr, env)?;
                Ok(ExecFlow::Return(value))
            }
            Stmt::Break => Ok(ExecFlow::Break),
            Stmt::Continue => Ok(ExecFlow::Continue),
            Stmt::FunctionDef { name, params, return_type, body } => {
                // Redefinition replaces the previous entry.
                self.functions.insert(
                    name.clone(),
                    FunctionDecl {
                        params: params.clone(),
                        return_type: return_type.clone(),
                        body: body.clone(),
                    },
                );
                Ok(ExecFlow::None)
            }
            Stmt::Expression(expr) => {
                self.eval_expr(expr, env)?;
                Ok(ExecFlow::None)
            }
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> Result<Value, Box<Error>> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            // An unbound name reads as null rather than erroring.
            ExprKind::Variable(name) => Ok(env.borrow().get(name).unwrap_or(Value::Null)),
            ExprKind::Unary { op, expr: inner } => {
                let value = self.eval_expr(inner, env)?;
                match op {
                    Operator::Not => Ok(Value::Bool(!value.is_truthy())),
                    Operator::Neg => ops::negate(&value).ok_or_else(|| {
                        Error::with_span(
                            ErrorKind::Type,
                            format!("operator `-` expects a number, got {}", value.type_name()),
                            expr.span,
                        )
                    }),
                    _ => unreachable!("parser only emits Not and Neg unaries"),
                }
            }
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, env, expr.span),
            ExprKind::Ternary { condition, then_expr, else_expr } => {
                if self.eval_expr(condition, env)?.is_truthy() {
                    self.eval_expr(then_expr, env)
                } else {
                    self.eval_expr(else_expr, env)
                }
            }
            ExprKind::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                self.call_function(name, values, expr.span)
            }
            ExprKind::ListLiteral(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, env)?);
                }
                Ok(Value::List(values))
            }
            ExprKind::Cast { ty, expr: inner } => {
                let value = self.eval_expr(inner, env)?;
                cast_value(ty, value).map_err(|e| e.at(expr.span))
            }
            ExprKind::Member { object, name } => {
                let value = self.eval_expr(object, env)?;
                member_access(&value, name).map_err(|e| e.at(expr.span))
            }
            ExprKind::MethodCall { object, method, args } => {
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push(self.eval_expr(object, env)?);
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                methods::dispatch(method, &values).map_err(|e| e.at(expr.span))
            }
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: Operator,
        right: &Expr,
        env: &EnvRef,
        span: Span,
    ) -> Result<Value, Box<Error>> {
        // Short-circuit operators evaluate the right side only when the
        // left side has not already decided the outcome.
        if op == Operator::And {
            let lhs = self.eval_expr(left, env)?;
            if !lhs.is_truthy() {
                return Ok(Value::Bool(false));
            }
            let rhs = self.eval_expr(right, env)?;
            return Ok(Value::Bool(rhs.is_truthy()));
        }
        if op == Operator::Or {
            let lhs = self.eval_expr(left, env)?;
            if lhs.is_truthy() {
                return Ok(Value::Bool(true));
            }
            let rhs = self.eval_expr(right, env)?;
            return Ok(Value::Bool(rhs.is_truthy()));
        }

        let lhs = self.eval_expr(left, env)?;
        let rhs = self.eval_expr(right, env)?;

        let mismatch = || {
            Error::with_span(
                ErrorKind::Type,
                format!(
                    "invalid operands for operator `{}`: {} and {}",
                    op.symbol(),
                    lhs.type_name(),
                    rhs.type_name()
                ),
                span,
            )
        };

        match op {
            Operator::Add => ops::add(&lhs, &rhs).ok_or_else(mismatch),
            Operator::Sub => ops::sub(&lhs, &rhs).ok_or_else(mismatch),
            Operator::Mul => ops::mul(&lhs, &rhs).ok_or_else(mismatch),
            Operator::Div => {
                if matches!(&rhs, Value::Int(0)) || matches!(&rhs, Value::Float(n) if *n == 0.0) {
                    return Err(Error::with_span(
                        ErrorKind::DivideByZero,
                        "division by zero",
                        span,
                    ));
                }
                ops::div(&lhs, &rhs).ok_or_else(mismatch)
            }
            Operator::Pow => ops::pow(&lhs, &rhs).ok_or_else(mismatch),
            Operator::Concat => Ok(ops::concat(&lhs, &rhs)),
            Operator::Eq => Ok(Value::Bool(lhs.loosely_equals(&rhs))),
            Operator::Ne => Ok(Value::Bool(!lhs.loosely_equals(&rhs))),
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le => {
                ops::compare(op, &lhs, &rhs).ok_or_else(mismatch)
            }
            Operator::And | Operator::Or | Operator::Not | Operator::Neg => {
                unreachable!("handled above or unary-only")
            }
        }
    }

    /// Call-by-name resolution: reserved names, then effect builtins, then
    /// the user function registry.
    fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, Box<Error>> {
        match name {
            "exit" => {
                return Err(Error::with_span(ErrorKind::Exit, "program terminated", span));
            }
            "fstring" => return format_template(&args).map_err(|e| e.at(span)),
            _ => {}
        }

        if let Some(result) = effects::handle(&mut self.effects, name, &args) {
            return result.map_err(|e| e.at(span));
        }

        if self.functions.contains_key(name) {
            return self.call_user_function(name, args, span);
        }

        Err(Error::with_span(
            ErrorKind::Runtime,
            format!("unknown function `{}`", name),
            span,
        ))
    }

    fn call_user_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, Box<Error>> {
        let decl = self.functions.get(name).expect("caller checked registry").clone();

        if args.len() != decl.params.len() {
            return Err(Error::with_span(
                ErrorKind::Arity,
                format!("{}() expects {} arguments, got {}", name, decl.params.len(), args.len()),
                span,
            ));
        }

        // Functions are not closures: the body scope hangs off the root
        // scope, not the caller's.
        let scope = Environment::with_parent(self.globals.clone());
        for (param, arg) in decl.params.iter().zip(args) {
            if !arg.matches_type(&param.ty) {
                return Err(Error::with_span(
                    ErrorKind::Type,
                    format!(
                        "parameter `{}` of {}() expects {}, got {}",
                        param.name,
                        name,
                        param.ty,
                        arg.type_name()
                    ),
                    span,
                ));
            }
            scope.borrow_mut().declare(&param.name, arg);
        }

        match self.eval_statements(&decl.body, &scope)? {
            ExecFlow::Return(value) => {
                if let Some(ty) = &decl.return_type {
                    if !value.matches_type(ty) {
                        return Err(Error::with_span(
                            ErrorKind::Type,
                            format!(
                                "{}() declared return type {} but returned {}",
                                name,
                                ty,
                                value.type_name()
                            ),
                            span,
                        ));
                    }
                }
                Ok(value)
            }
            ExecFlow::None => {
                if decl.return_type.is_some() {
                    return Err(Error::with_span(
                        ErrorKind::Type,
                        "function did not return a value",
                        span,
                    ));
                }
                Ok(Value::Null)
            }
            ExecFlow::Break | ExecFlow::Continue => Err(Error::with_span(
                ErrorKind::Runtime,
                "unexpected control flow in function body",
                span,
            )),
        }
    }
}

/// The `fstring` builtin: `%N` names the N-th substitution argument
/// (1-based); a `%` not followed by a digit passes through.
fn format_template(args: &[Value]) -> Result<Value, Box<Error>> {
    let template = match args.first() {
        Some(Value::Str(s)) => s,
        _ => {
            return Err(Error::type_error("first argument to fstring must be a string template"));
        }
    };

    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
            let mut j = i + 1;
            let mut index = 0usize;
            while j < chars.len() && chars[j].is_ascii_digit() {
                index = index * 10 + (chars[j] as usize - '0' as usize);
                j += 1;
            }
            if index >= 1 && index < args.len() {
                out.push_str(&args[index].to_string());
            } else {
                return Err(Error::runtime(format!(
                    "fstring placeholder %{} out of range (only {} arguments provided)",
                    index,
                    args.len() - 1
                )));
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    Ok(Value::Str(out))
}

/// Cast table for `T(expr)`.
fn cast_value(ty: &Type, value: Value) -> Result<Value, Box<Error>> {
    let reject = |value: &Value| {
        Err(Error::type_error(format!("cannot cast {} to {}", value.type_name(), ty)))
    };
    match ty {
        Type::Int => match value {
            Value::Int(n) => Ok(Value::Int(n)),
            Value::Float(n) => Ok(Value::Int(n.trunc() as i64)),
            Value::Bool(b) => Ok(Value::Int(if b { 1 } else { 0 })),
            other => reject(&other),
        },
        Type::Float => match value {
            Value::Int(n) => Ok(Value::Float(n as f64)),
            Value::Float(n) => Ok(Value::Float(n)),
            other => reject(&other),
        },
        Type::String => Ok(Value::Str(value.to_string())),
        Type::Bool => Ok(Value::Bool(value.is_truthy())),
        Type::Regex | Type::Match | Type::Null | Type::List(_) => reject(&value),
    }
}

/// Member access on regex and match values.
fn member_access(value: &Value, name: &str) -> Result<Value, Box<Error>> {
    match (value, name) {
        (Value::Regex(re), "re") => Ok(Value::Str(re.pattern.clone())),
        (Value::Regex(re), "flags") => Ok(Value::Str(re.flags.clone())),
        (Value::Match(m), "start") => Ok(Value::Int(m.start as i64)),
        (Value::Match(m), "end") => Ok(Value::Int(m.end as i64)),
        (Value::Match(m), "content") => Ok(Value::Str(m.content.clone())),
        (Value::Regex(_) | Value::Match(_), _) => Err(Error::runtime(format!(
            "unknown member `{}` on {}",
            name,
            value.type_name()
        ))),
        _ => Err(Error::runtime(format!(
            "member access is not supported on {}",
            value.type_name()
        ))),
    }
}
