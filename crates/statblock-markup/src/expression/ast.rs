//! Expression trees produced by the damage-expression parser.

use std::fmt;

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl BinaryOp {
    /// Source symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Binding strength; both levels are left-associative.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide => 2,
        }
    }

    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(Self::Add),
            b'-' => Some(Self::Subtract),
            b'*' => Some(Self::Multiply),
            b'/' => Some(Self::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Built-in function callable from a damage expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// `ceil(x)`: round up.
    Ceil,
    /// `floor(x)`: round down.
    Floor,
    /// `ternary(cond, a, b)`: pick `a` when `cond` holds, `b` otherwise.
    Ternary,
    /// `gte(a, b)`: `a >= b`, usable only as a `ternary` condition.
    Gte,
    /// `max(a, b)`: numeric maximum.
    Max,
}

impl Function {
    /// Every function, in lookup order.
    pub const ALL: [Self; 5] = [
        Self::Ceil,
        Self::Floor,
        Self::Ternary,
        Self::Gte,
        Self::Max,
    ];

    /// Name as written in source text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Ternary => "ternary",
            Self::Gte => "gte",
            Self::Max => "max",
        }
    }

    /// Number of arguments the function takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Ceil | Self::Floor => 1,
            Self::Gte | Self::Max => 2,
            Self::Ternary => 3,
        }
    }

    /// Look up a function by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }
}

/// Node of a parsed damage expression. Each node owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Numeric literal.
    Number(f64),
    /// Dice roll such as `2d8`, a rank reference, or any other opaque atom.
    Identifier(String),
    /// Arithmetic on two operands.
    BinaryOp {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },
    /// Call of a built-in function.
    FunctionCall {
        /// Called function.
        function: Function,
        /// Arguments in source order.
        args: Vec<Self>,
    },
    /// Parenthesised die count followed by a die size, as in `(@item.level)d4`.
    DiceCount {
        /// Expression producing the number of dice.
        count: Box<Self>,
        /// Die suffix, such as `d4`.
        die: String,
    },
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Identifier(text) => f.write_str(text),
            Self::BinaryOp { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::FunctionCall { function, args } => {
                write!(f, "{}(", function.name())?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::DiceCount { count, die } => write!(f, "({count}){die}"),
        }
    }
}

/// One roll of a damage tag: an expression and its optional damage type.
#[derive(Debug, Clone, PartialEq)]
pub struct RollTerm {
    pub(crate) expression: ExpressionNode,
    pub(crate) annotation: Option<String>,
    pub(crate) source: String,
    pub(crate) offset: usize,
}

impl RollTerm {
    /// Parsed roll expression.
    #[must_use]
    pub const fn expression(&self) -> &ExpressionNode {
        &self.expression
    }

    /// Raw text between the type brackets, if the term had any.
    #[must_use]
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// Source text of the term, annotation excluded.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Byte offset of the term inside the expression.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}
