use std::cell::Cell;

use crate::token::Token;
use crate::value::Value;

/// Identity tag for a single expression occurrence in the AST. The resolver
/// keys its depth table on this, not on structural content, since the same
/// literal sub-expression can appear at multiple call sites and each needs
/// an independent resolution entry (`spec.md` §9 "AST identity for the
/// resolve map"). Assigned once at construction and never recomputed, so it
/// stays stable across the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

thread_local! {
    static NEXT_ID: Cell<u32> = const { Cell::new(0) };
}

fn next_id() -> ExprId {
    NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        ExprId(id)
    })
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Value),
    Grouping(Box<Expr>),
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        keyword: Token,
    },
    Super {
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Expr { id: next_id(), kind }
    }

    pub fn literal(value: Value) -> Self {
        Expr::new(ExprKind::Literal(value))
    }

    pub fn grouping(inner: Expr) -> Self {
        Expr::new(ExprKind::Grouping(Box::new(inner)))
    }

    pub fn unary(operator: Token, right: Expr) -> Self {
        Expr::new(ExprKind::Unary { operator, right: Box::new(right) })
    }

    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::new(ExprKind::Binary { left: Box::new(left), operator, right: Box::new(right) })
    }

    pub fn logical(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::new(ExprKind::Logical { left: Box::new(left), operator, right: Box::new(right) })
    }

    pub fn variable(name: Token) -> Self {
        Expr::new(ExprKind::Variable { name })
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Expr::new(ExprKind::Assign { name, value: Box::new(value) })
    }

    pub fn call(callee: Expr, paren: Token, arguments: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Call { callee: Box::new(callee), paren, arguments })
    }

    pub fn get(object: Expr, name: Token) -> Self {
        Expr::new(ExprKind::Get { object: Box::new(object), name })
    }

    pub fn set(object: Expr, name: Token, value: Expr) -> Self {
        Expr::new(ExprKind::Set { object: Box::new(object), name, value: Box::new(value) })
    }

    pub fn this(keyword: Token) -> Self {
        Expr::new(ExprKind::This { keyword })
    }

    pub fn super_(keyword: Token, method: Token) -> Self {
        Expr::new(ExprKind::Super { keyword, method })
    }
}
