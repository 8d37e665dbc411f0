//! AST node definitions for Go source

use gosift_lexer::Span;

/// The closed set of syntax node shapes rules can target.
///
/// The rule registry is keyed by this discriminant; dispatch resolves a
/// node's kind once per visit and never needs runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    ImportSpec,
    ValueSpec,
    FuncDecl,
    Block,
    IfStmt,
    ForStmt,
    RangeStmt,
    SwitchStmt,
    SelectStmt,
    ReturnStmt,
    DeferStmt,
    GoStmt,
    SendStmt,
    AssignStmt,
    IncDecStmt,
    BranchStmt,
    ExprStmt,
    EmptyStmt,
    DeclStmt,
    Ident,
    BasicLit,
    SelectorExpr,
    CallExpr,
    IndexExpr,
    SliceExpr,
    TypeAssertExpr,
    UnaryExpr,
    BinaryExpr,
    ParenExpr,
    FuncLit,
    CompositeLit,
}

/// A single Go source file
#[derive(Debug, Clone)]
pub struct File<'a> {
    pub package: Ident<'a>,
    pub decls: Vec<Decl<'a>>,
    pub span: Span,
}

/// An identifier with its span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'a> {
    pub name: &'a str,
    pub span: Span,
}

/// A top-level (or statement-level) declaration
#[derive(Debug, Clone)]
pub enum Decl<'a> {
    /// `import "x"` or `import ( ... )`
    Import { specs: Vec<ImportSpec<'a>>, span: Span },
    /// `var ...` or `const ...`
    Value { specs: Vec<ValueSpec<'a>>, span: Span },
    /// `func name(...) ... { ... }`
    Func(FuncDecl<'a>),
    /// `type T ...` - body kept opaque
    Type { name: Option<Ident<'a>>, span: Span },
}

impl Decl<'_> {
    pub fn span(&self) -> Span {
        match self {
            Decl::Import { span, .. } | Decl::Value { span, .. } | Decl::Type { span, .. } => *span,
            Decl::Func(f) => f.span,
        }
    }
}

/// One import line: `alias "path"`, `. "path"`, or `"path"`
#[derive(Debug, Clone)]
pub struct ImportSpec<'a> {
    /// `.`, `_`, or an explicit alias; `None` for the default name
    pub alias: Option<Ident<'a>>,
    /// The quoted path literal as written
    pub path: &'a str,
    pub span: Span,
}

/// Keyword of a value declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKeyword {
    Var,
    Const,
}

/// One `name [type] [= value]` group inside a var/const declaration
#[derive(Debug, Clone)]
pub struct ValueSpec<'a> {
    pub keyword: ValueKeyword,
    /// Span of the `var`/`const` keyword token
    pub keyword_span: Span,
    pub names: Vec<Ident<'a>>,
    pub ty_span: Option<Span>,
    pub values: Vec<Expr<'a>>,
    /// True when the spec sits inside a parenthesized group
    pub grouped: bool,
    pub span: Span,
}

/// A function declaration
#[derive(Debug, Clone)]
pub struct FuncDecl<'a> {
    pub name: Ident<'a>,
    pub recv: Option<Param<'a>>,
    pub params: Vec<Param<'a>>,
    /// Span from `(` to `)` of the parameter list
    pub params_span: Span,
    pub results_span: Option<Span>,
    /// `None` for bodyless declarations (assembly/linkname stubs)
    pub body: Option<Block<'a>>,
    pub span: Span,
}

impl FuncDecl<'_> {
    /// Number of parameters the function takes; an unnamed parameter
    /// counts as one (mirrors `go/ast` field semantics).
    pub fn param_count(&self) -> usize {
        self.params
            .iter()
            .map(|p| p.names.len().max(1))
            .sum()
    }
}

/// A parameter (or receiver) field: `a, b int` or a bare type
#[derive(Debug, Clone)]
pub struct Param<'a> {
    pub names: Vec<Ident<'a>>,
    pub ty_span: Span,
    pub variadic: bool,
    pub span: Span,
}

/// A braced statement list
#[derive(Debug, Clone)]
pub struct Block<'a> {
    pub stmts: Vec<Stmt<'a>>,
    pub span: Span,
}

/// `break` / `continue` / `goto` / `fallthrough`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// A statement
#[derive(Debug, Clone)]
pub enum Stmt<'a> {
    /// `var`/`const`/`type` declaration in statement position
    Decl(Decl<'a>),
    /// Assignment or short variable declaration
    Assign {
        lhs: Vec<Expr<'a>>,
        op: AssignOp,
        op_span: Span,
        rhs: Vec<Expr<'a>>,
        span: Span,
    },
    /// `x++` or `x--`
    IncDec {
        expr: Expr<'a>,
        is_inc: bool,
        span: Span,
    },
    If {
        init: Option<Box<Stmt<'a>>>,
        cond: Expr<'a>,
        then: Block<'a>,
        els: Option<Box<Stmt<'a>>>,
        span: Span,
    },
    /// Classic `for` in any of its three forms
    For {
        init: Option<Box<Stmt<'a>>>,
        cond: Option<Expr<'a>>,
        post: Option<Box<Stmt<'a>>>,
        body: Block<'a>,
        span: Span,
    },
    /// `for k, v := range subject { ... }`
    Range {
        key: Option<Expr<'a>>,
        value: Option<Expr<'a>>,
        define: bool,
        subject: Expr<'a>,
        body: Block<'a>,
        span: Span,
    },
    Switch {
        init: Option<Box<Stmt<'a>>>,
        tag: Option<Expr<'a>>,
        cases: Vec<CaseClause<'a>>,
        span: Span,
    },
    Select {
        cases: Vec<CommClause<'a>>,
        span: Span,
    },
    Return {
        results: Vec<Expr<'a>>,
        span: Span,
    },
    Defer {
        call: Expr<'a>,
        span: Span,
    },
    Go {
        call: Expr<'a>,
        span: Span,
    },
    /// `ch <- value`
    Send {
        chan: Expr<'a>,
        value: Expr<'a>,
        span: Span,
    },
    Branch {
        kind: BranchKind,
        label: Option<Ident<'a>>,
        span: Span,
    },
    Block(Block<'a>),
    Expr {
        expr: Expr<'a>,
        span: Span,
    },
    Empty {
        span: Span,
    },
}

impl Stmt<'_> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Decl(d) => d.span(),
            Stmt::Assign { span, .. }
            | Stmt::IncDec { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Range { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::Select { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Defer { span, .. }
            | Stmt::Go { span, .. }
            | Stmt::Send { span, .. }
            | Stmt::Branch { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::Empty { span } => *span,
            Stmt::Block(b) => b.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Stmt::Decl(_) => NodeKind::DeclStmt,
            Stmt::Assign { .. } => NodeKind::AssignStmt,
            Stmt::IncDec { .. } => NodeKind::IncDecStmt,
            Stmt::If { .. } => NodeKind::IfStmt,
            Stmt::For { .. } => NodeKind::ForStmt,
            Stmt::Range { .. } => NodeKind::RangeStmt,
            Stmt::Switch { .. } => NodeKind::SwitchStmt,
            Stmt::Select { .. } => NodeKind::SelectStmt,
            Stmt::Return { .. } => NodeKind::ReturnStmt,
            Stmt::Defer { .. } => NodeKind::DeferStmt,
            Stmt::Go { .. } => NodeKind::GoStmt,
            Stmt::Send { .. } => NodeKind::SendStmt,
            Stmt::Branch { .. } => NodeKind::BranchStmt,
            Stmt::Block(_) => NodeKind::Block,
            Stmt::Expr { .. } => NodeKind::ExprStmt,
            Stmt::Empty { .. } => NodeKind::EmptyStmt,
        }
    }
}

/// `case a, b:` or `default:`
#[derive(Debug, Clone)]
pub struct CaseClause<'a> {
    /// Empty for `default`
    pub values: Vec<Expr<'a>>,
    pub body: Vec<Stmt<'a>>,
    pub span: Span,
}

/// One `select` communication clause
#[derive(Debug, Clone)]
pub struct CommClause<'a> {
    /// The send or receive statement after `case`; `None` for `default`
    pub comm: Option<Box<Stmt<'a>>>,
    pub body: Vec<Stmt<'a>>,
    pub span: Span,
}

/// Assignment operators, including short declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    /// Whether the statement writes through an existing binding rather
    /// than declaring a new one.
    pub fn mutates(&self) -> bool {
        !matches!(self, AssignOp::Define)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    /// Address-of `&`
    Amp,
    /// Pointer dereference `*`
    Deref,
    /// Bitwise complement `^`
    Xor,
    /// Channel receive `<-`
    Recv,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Kinds of basic literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
}

/// An expression
#[derive(Debug, Clone)]
pub enum Expr<'a> {
    Ident(Ident<'a>),
    BasicLit {
        kind: LitKind,
        value: &'a str,
        span: Span,
    },
    Selector {
        recv: Box<Expr<'a>>,
        sel: Ident<'a>,
        span: Span,
    },
    Call {
        fun: Box<Expr<'a>>,
        args: Vec<Expr<'a>>,
        span: Span,
    },
    Index {
        recv: Box<Expr<'a>>,
        index: Box<Expr<'a>>,
        span: Span,
    },
    Slice {
        recv: Box<Expr<'a>>,
        low: Option<Box<Expr<'a>>>,
        high: Option<Box<Expr<'a>>>,
        max: Option<Box<Expr<'a>>>,
        span: Span,
    },
    /// `x.(T)` - the asserted type is not modeled
    TypeAssert {
        recv: Box<Expr<'a>>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr<'a>>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr<'a>>,
        right: Box<Expr<'a>>,
        span: Span,
    },
    Paren {
        inner: Box<Expr<'a>>,
        span: Span,
    },
    FuncLit {
        params: Vec<Param<'a>>,
        results_span: Option<Span>,
        body: Box<Block<'a>>,
        span: Span,
    },
    /// `T{...}` - contents kept opaque apart from the identifiers that
    /// appeared inside, recorded for mutation tracking
    Composite {
        idents: Vec<Ident<'a>>,
        span: Span,
    },
}

impl Expr<'_> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(id) => id.span,
            Expr::BasicLit { span, .. }
            | Expr::Selector { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::Slice { span, .. }
            | Expr::TypeAssert { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Paren { span, .. }
            | Expr::FuncLit { span, .. }
            | Expr::Composite { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Ident(_) => NodeKind::Ident,
            Expr::BasicLit { .. } => NodeKind::BasicLit,
            Expr::Selector { .. } => NodeKind::SelectorExpr,
            Expr::Call { .. } => NodeKind::CallExpr,
            Expr::Index { .. } => NodeKind::IndexExpr,
            Expr::Slice { .. } => NodeKind::SliceExpr,
            Expr::TypeAssert { .. } => NodeKind::TypeAssertExpr,
            Expr::Unary { .. } => NodeKind::UnaryExpr,
            Expr::Binary { .. } => NodeKind::BinaryExpr,
            Expr::Paren { .. } => NodeKind::ParenExpr,
            Expr::FuncLit { .. } => NodeKind::FuncLit,
            Expr::Composite { .. } => NodeKind::CompositeLit,
        }
    }

    /// The identifier at the core of this expression, unwrapping parens
    pub fn as_ident(&self) -> Option<&Ident<'_>> {
        match self {
            Expr::Ident(id) => Some(id),
            Expr::Paren { inner, .. } => inner.as_ident(),
            _ => None,
        }
    }
}
