//! Statement and expression nodes. The tree is built once per parse and
//! never mutated; the runtime re-walks it every frame. `PartialEq` is
//! derived throughout so parses of the same source compare structurally.

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `CanvasSize = (500, 500)`
    CanvasSize { width: Expr, height: Expr },
    /// `function name(a, b):` + indented body
    FnDef(FnDef),
    /// `x = expr` or `board[i][j] = expr`
    Assign {
        name: String,
        indices: Vec<Expr>,
        value: Expr,
    },
    /// `loop i=EXPR times:` — the counter variable is optional
    LoopFor {
        var: Option<String>,
        count: Expr,
        body: Vec<Stmt>,
    },
    /// `loop while COND:`
    LoopWhile { condition: Expr, body: Vec<Stmt> },
    /// `if COND:` with an optional `else:` at the same indent
    If {
        condition: Expr,
        then_block: Vec<Stmt>,
        else_block: Vec<Stmt>,
    },
    /// A bare call used as a statement: `circle(x, y, r)`
    Call { callee: String, args: Vec<Expr> },
    /// `return` or `return expr` — only meaningful in a function body
    Return(Option<Expr>),
    /// Any line no other rule matched. Inert: carried for tooling, never
    /// executed, never a parse failure.
    Unknown(String),
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Str(String),
    Bool(bool),
    Ident(String),

    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    UnOp { op: UnOp, operand: Box<Expr> },

    /// `name(args)`
    Call { callee: String, args: Vec<Expr> },

    /// `expr[index]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },

    /// `[1, 2, 3]`
    List(Vec<Expr>),

    /// Raw text of an expression that failed to parse. Evaluating it reports
    /// the failure with this text and yields `undefined`, so a bad condition
    /// never destroys the block structure around it.
    Unparsed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
