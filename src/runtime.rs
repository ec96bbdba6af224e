use std::{
    io::{self, Write},
    rc::Rc,
};

use crate::{
    ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, Stmt, StmtKind, UnaryOp},
    diagnostics::{Diagnostic, LoxError, Result},
    environment::{Environment, EnvironmentRef},
    parser, stdlib,
    value::{UserFunction, Value},
};

/// Outcome of executing a statement. `Return` unwinds enclosing blocks and
/// loops until the function call that owns it turns it into a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree-walking evaluator. `print` output goes to `W` (stdout by default).
pub struct Interpreter<W: Write = io::Stdout> {
    env: EnvironmentRef,
    globals: EnvironmentRef,
    call_depth: usize,
    out: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        let globals = Environment::new();
        stdlib::install(&globals);
        Self {
            env: Rc::clone(&globals),
            globals,
            call_depth: 0,
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        Environment::get(&self.globals, name, 0).ok()
    }

    pub fn run_source(&mut self, source: &str) -> Result<()> {
        let program = parser::parse_program(source)?;
        self.execute(&program)
    }

    pub fn evaluate_source(&mut self, source: &str) -> Result<Value> {
        let expr = parser::parse_expression(source)?;
        self.evaluate(&expr)
    }

    pub fn execute(&mut self, statements: &[Stmt]) -> Result<()> {
        let result = statements
            .iter()
            .try_for_each(|stmt| self.execute_statement(stmt).map(|_| ()));
        self.out.flush()?;
        if let Err(LoxError::Runtime(diagnostic)) = &result {
            tracing::debug!(line = diagnostic.line, "runtime error: {}", diagnostic.message);
        }
        result
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{value}")?;
                Ok(Flow::Normal)
            }
            StmtKind::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.env.borrow_mut().define(name.clone(), value);
                Ok(Flow::Normal)
            }
            StmtKind::Block(statements) => {
                let child = Environment::with_parent(Rc::clone(&self.env));
                self.execute_block(statements, child)
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_statement(then_branch)
                } else if let Some(branch) = else_branch {
                    self.execute_statement(branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute_statement(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Function(decl) => {
                let function = UserFunction::new(Rc::clone(decl), Rc::clone(&self.env));
                self.env
                    .borrow_mut()
                    .define(decl.name.clone(), Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }
            StmtKind::Return(value) => {
                if self.call_depth == 0 {
                    return Err(runtime_error(stmt.line, "Can't return from top-level code."));
                }
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Runs `statements` with `env` as the current frame. The previous frame
    /// is restored on every exit path, errors included.
    fn execute_block(&mut self, statements: &[Stmt], env: EnvironmentRef) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.env, env);
        let result = self.execute_sequence(statements);
        self.env = previous;
        result
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute_statement(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(literal_value(literal)),
            ExprKind::Grouping(inner) => self.evaluate(inner),
            ExprKind::Unary { op, expr: operand } => {
                let value = self.evaluate(operand)?;
                unary(*op, value, expr.line)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*op, &left, &right, expr.line)
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.evaluate(left)?;
                let short_circuits = match op {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            ExprKind::Variable(name) => Ok(Environment::get(&self.env, name, expr.line)?),
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;
                Environment::assign(&self.env, name, value.clone(), expr.line)?;
                Ok(value)
            }
            ExprKind::Call { callee, args } => {
                let callee = self.evaluate(callee)?;
                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.evaluate(arg)?);
                }
                self.call(callee, arguments, expr.line)
            }
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>, line: usize) -> Result<Value> {
        match callee {
            Value::NativeFunction(native) => {
                check_arity(native.arity, args.len(), line)?;
                tracing::trace!(name = native.name, "calling native function");
                Ok(native.call(&args))
            }
            Value::Function(function) => {
                check_arity(function.arity(), args.len(), line)?;
                self.call_function(&function, args)
            }
            _ => Err(runtime_error(line, "Can only call functions and classes.")),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = function.name(), depth = self.call_depth))]
    fn call_function(&mut self, function: &UserFunction, args: Vec<Value>) -> Result<Value> {
        let frame = Environment::with_parent(Rc::clone(&function.closure));
        {
            let mut scope = frame.borrow_mut();
            for (param, value) in function.declaration.params.iter().zip(args) {
                scope.define(param.clone(), value);
            }
        }
        self.call_depth += 1;
        let result = self.execute_block(&function.declaration.body, frame);
        self.call_depth -= 1;
        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::string(s.as_str()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Nil => Value::Nil,
    }
}

fn unary(op: UnaryOp, value: Value, line: usize) -> Result<Value> {
    match op {
        UnaryOp::Negate => match value {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(operator_error(op.symbol(), line, "Operand must be a number.")),
        },
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value, line: usize) -> Result<Value> {
    match op {
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
            _ => Err(operator_error(
                op.symbol(),
                line,
                "Operands must be two numbers or two strings.",
            )),
        },
        BinaryOp::Sub => arithmetic(op, left, right, line, |a, b| a - b),
        BinaryOp::Mul => arithmetic(op, left, right, line, |a, b| a * b),
        BinaryOp::Div => arithmetic(op, left, right, line, |a, b| a / b),
        BinaryOp::Less => comparison(op, left, right, line, |a, b| a < b),
        BinaryOp::LessEqual => comparison(op, left, right, line, |a, b| a <= b),
        BinaryOp::Greater => comparison(op, left, right, line, |a, b| a > b),
        BinaryOp::GreaterEqual => comparison(op, left, right, line, |a, b| a >= b),
    }
}

fn arithmetic<F>(op: BinaryOp, left: &Value, right: &Value, line: usize, func: F) -> Result<Value>
where
    F: Fn(f64, f64) -> f64,
{
    let (a, b) = numbers(op, left, right, line)?;
    Ok(Value::Number(func(a, b)))
}

fn comparison<F>(op: BinaryOp, left: &Value, right: &Value, line: usize, cmp: F) -> Result<Value>
where
    F: Fn(f64, f64) -> bool,
{
    let (a, b) = numbers(op, left, right, line)?;
    Ok(Value::Bool(cmp(a, b)))
}

fn numbers(op: BinaryOp, left: &Value, right: &Value, line: usize) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(operator_error(op.symbol(), line, "Operands must be numbers.")),
    }
}

fn check_arity(expected: usize, got: usize, line: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(runtime_error(
            line,
            format!("Expected {expected} arguments but got {got}."),
        ))
    }
}

fn runtime_error(line: usize, message: impl Into<String>) -> LoxError {
    LoxError::Runtime(Diagnostic::runtime(line, message))
}

fn operator_error(symbol: &str, line: usize, message: &str) -> LoxError {
    LoxError::Runtime(Diagnostic::runtime(line, message).with_location(format!("at '{symbol}'")))
}
