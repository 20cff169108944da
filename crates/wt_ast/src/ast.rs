use wt_syntax::Span;

/// A compiled script: message handlers plus user functions.
///
/// Produced once by the parser and treated as immutable by the runtime,
/// which only ever performs case-insensitive name lookup on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Script {
    pub handlers: Box<[Handler]>,
    pub functions: Box<[Handler]>,
}

/// A named statement block: `on name …` or `function name …`.
#[derive(Clone, Debug, PartialEq)]
pub struct Handler {
    pub name: String,
    pub params: Box<[String]>,
    pub body: Box<[Stmt]>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// `put expr [into|before|after container]`
    Put(Box<PutStmt>),
    /// `get expr` — binds `it`.
    Get(Expr),
    /// `global a, b, c`
    Global(Box<[String]>),
    /// `pass message`
    Pass(String),
    /// `return [expr]`
    Return(Option<Expr>),
    /// `send expr [to target]`
    Send(Box<SendStmt>),
    /// `do expr` — compiles and runs the text in a fresh frame.
    Do(Expr),
    If(Box<IfStmt>),
    Repeat(Box<RepeatStmt>),
    ExitRepeat,
    NextRepeat,
    /// `exit handlerName`
    ExitHandler(String),
    /// A bare command line, delivered as a message send.
    Command(Box<CommandStmt>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PutStmt {
    pub value: Expr,
    pub dest: Option<(Preposition, Container)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preposition {
    Before,
    Into,
    After,
    Replacing,
}

/// Something a `put` can write to: a variable, or a chunk of a container.
#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Variable(String),
    Chunk(Box<ContainerChunk>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerChunk {
    pub kind: ChunkKind,
    pub start: ChunkIndex,
    pub end: Option<ChunkIndex>,
    pub target: Container,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SendStmt {
    pub message: Expr,
    /// `None` means "to me".
    pub target: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<[Stmt]>,
    pub else_branch: Option<Box<[Stmt]>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RepeatStmt {
    pub kind: RepeatKind,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RepeatKind {
    Forever,
    Times(Expr),
    While(Expr),
    Until(Expr),
    With {
        var: String,
        from: Expr,
        to: Expr,
        down: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandStmt {
    pub name: String,
    pub args: Box<[Expr]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkKind {
    Char,
    Word,
    Item,
    Line,
}

/// A chunk index: an expression that must evaluate to a 1-based natural,
/// or the literal ordinal `middle`.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkIndex {
    Expr(Expr),
    Middle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// The `empty` constant.
    Empty,
    Var(String),
    /// `the result`
    TheResult,
    /// `the params`
    TheParams,
    /// `the paramCount`
    TheParamCount,
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Chunk(Box<ChunkExpr>),
    Call(Box<CallExpr>),
    Group(Box<Expr>),
}

/// `kind start [to end] of source`, e.g. `char 1 to 3 of item 2 of x`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkExpr {
    pub kind: ChunkKind,
    pub start: ChunkIndex,
    pub end: Option<ChunkIndex>,
    pub source: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Box<[Expr]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    /// `&`
    Concat,
    /// `&&` — concatenation with a single space between.
    ConcatSpace,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Contains,
}
