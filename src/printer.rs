//! Parenthesized prefix rendering of the syntax tree, for debugging and the
//! `parse` subcommand. The output is not meant to be parsed back.

use crate::ast::{Expr, ExprKind, Stmt, StmtKind};

pub fn render_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal(literal) => literal.to_string(),
        ExprKind::Grouping(inner) => parenthesize("group", [inner.as_ref()]),
        ExprKind::Unary { op, expr } => parenthesize(op.symbol(), [expr.as_ref()]),
        ExprKind::Binary { op, left, right } => {
            parenthesize(op.symbol(), [left.as_ref(), right.as_ref()])
        }
        ExprKind::Logical { op, left, right } => {
            parenthesize(op.symbol(), [left.as_ref(), right.as_ref()])
        }
        ExprKind::Variable(name) => name.clone(),
        ExprKind::Assign { name, value } => format!("(= {name} {})", render_expr(value)),
        ExprKind::Call { callee, args } => {
            parenthesize("call", std::iter::once(callee.as_ref()).chain(args.iter()))
        }
    }
}

/// Renders each top-level statement on its own line.
pub fn render_program(statements: &[Stmt]) -> String {
    statements
        .iter()
        .map(render_stmt)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_stmt(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Expr(expr) => format!("(; {})", render_expr(expr)),
        StmtKind::Print(expr) => format!("(print {})", render_expr(expr)),
        StmtKind::Var { name, initializer } => match initializer {
            Some(init) => format!("(var {name} {})", render_expr(init)),
            None => format!("(var {name})"),
        },
        StmtKind::Block(statements) => render_block("block", statements),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut out = format!("(if {} {}", render_expr(condition), render_stmt(then_branch));
            if let Some(branch) = else_branch {
                out.push(' ');
                out.push_str(&render_stmt(branch));
            }
            out.push(')');
            out
        }
        StmtKind::While { condition, body } => {
            format!("(while {} {})", render_expr(condition), render_stmt(body))
        }
        StmtKind::Function(decl) => {
            let head = format!("fun {} ({})", decl.name, decl.params.join(" "));
            render_block(&head, &decl.body)
        }
        StmtKind::Return(value) => match value {
            Some(value) => format!("(return {})", render_expr(value)),
            None => "(return)".to_string(),
        },
    }
}

fn render_block(head: &str, statements: &[Stmt]) -> String {
    let mut out = format!("({head}");
    for stmt in statements {
        out.push(' ');
        out.push_str(&render_stmt(stmt));
    }
    out.push(')');
    out
}

fn parenthesize<'a>(name: &str, exprs: impl IntoIterator<Item = &'a Expr>) -> String {
    let mut out = format!("({name}");
    for expr in exprs {
        out.push(' ');
        out.push_str(&render_expr(expr));
    }
    out.push(')');
    out
}
