//! IR instructions
//!
//! Instructions are three-address operations. Terminators (`br`, `jmp`,
//! `ret`, `unreachable`) are ordinary instructions that must appear last in
//! their block; keeping them in the instruction list means the printed block
//! is exactly its instruction sequence, which is what the structural differ
//! aligns on.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{Type, Value};

/// A source location attached to an instruction via `!loc("file", line, col)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebugLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl DebugLoc {
    /// The `file:line:col` form carried into instruction records
    pub fn format(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Binary arithmetic and bitwise operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl BinOp {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::Shr => "shr",
        }
    }

    /// Evaluate the operator over two integer constants
    ///
    /// Returns `None` for division by zero and shift amounts outside the
    /// 64-bit range; the folder leaves those instructions alone.
    pub fn eval(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Self::Add => Some(lhs.wrapping_add(rhs)),
            Self::Sub => Some(lhs.wrapping_sub(rhs)),
            Self::Mul => Some(lhs.wrapping_mul(rhs)),
            Self::Div => {
                if rhs == 0 {
                    None
                } else {
                    Some(lhs.wrapping_div(rhs))
                }
            }
            Self::And => Some(lhs & rhs),
            Self::Or => Some(lhs | rhs),
            Self::Xor => Some(lhs ^ rhs),
            Self::Shl => u32::try_from(rhs).ok().map(|s| lhs.wrapping_shl(s)),
            Self::Shr => u32::try_from(rhs).ok().map(|s| lhs.wrapping_shr(s)),
        }
    }
}

/// Integer comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcmpPred {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl IcmpPred {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Slt => "slt",
            Self::Sle => "sle",
            Self::Sgt => "sgt",
            Self::Sge => "sge",
        }
    }

    pub const fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Slt => lhs < rhs,
            Self::Sle => lhs <= rhs,
            Self::Sgt => lhs > rhs,
            Self::Sge => lhs >= rhs,
        }
    }
}

/// The operation performed by an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    Binary {
        op: BinOp,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    Icmp {
        pred: IcmpPred,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    Select {
        ty: Type,
        cond: Value,
        if_true: Value,
        if_false: Value,
    },
    /// Reserve `count` stack slots of `ty`; yields a pointer
    Alloca {
        ty: Type,
        count: u32,
    },
    Load {
        ty: Type,
        ptr: Value,
        volatile: bool,
    },
    Store {
        ty: Type,
        value: Value,
        ptr: Value,
        volatile: bool,
    },
    Call {
        ret_ty: Type,
        callee: String,
        args: Vec<(Type, Value)>,
    },
    /// Conditional branch on an `i1` value
    Br {
        cond: Value,
        then_label: String,
        else_label: String,
    },
    /// Unconditional branch
    Jmp {
        target: String,
    },
    Ret {
        ty: Type,
        value: Option<Value>,
    },
    Unreachable,
}

/// One IR instruction: an optional result name, an opcode and an optional
/// debug location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Name of the defined temporary, without the `%` sigil
    pub result: Option<String>,
    pub opcode: Opcode,
    pub loc: Option<DebugLoc>,
}

impl Instruction {
    pub const fn new(result: Option<String>, opcode: Opcode) -> Self {
        Self {
            result,
            opcode,
            loc: None,
        }
    }

    pub fn with_loc(mut self, loc: DebugLoc) -> Self {
        self.loc = Some(loc);
        self
    }

    /// The opcode's mnemonic, used in instruction records
    pub const fn opcode_name(&self) -> &'static str {
        match &self.opcode {
            Opcode::Binary { op, .. } => op.mnemonic(),
            Opcode::Icmp { .. } => "icmp",
            Opcode::Select { .. } => "select",
            Opcode::Alloca { .. } => "alloca",
            Opcode::Load { .. } => "load",
            Opcode::Store { .. } => "store",
            Opcode::Call { .. } => "call",
            Opcode::Br { .. } => "br",
            Opcode::Jmp { .. } => "jmp",
            Opcode::Ret { .. } => "ret",
            Opcode::Unreachable => "unreachable",
        }
    }

    pub const fn is_terminator(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Br { .. } | Opcode::Jmp { .. } | Opcode::Ret { .. } | Opcode::Unreachable
        )
    }

    /// Whether removing this instruction could change observable behavior
    pub const fn has_side_effects(&self) -> bool {
        match &self.opcode {
            Opcode::Store { .. } | Opcode::Call { .. } => true,
            Opcode::Load { volatile, .. } => *volatile,
            _ => self.is_terminator(),
        }
    }

    /// All value operands, in printed order
    pub fn operands(&self) -> Vec<&Value> {
        match &self.opcode {
            Opcode::Binary { lhs, rhs, .. } | Opcode::Icmp { lhs, rhs, .. } => vec![lhs, rhs],
            Opcode::Select {
                cond,
                if_true,
                if_false,
                ..
            } => vec![cond, if_true, if_false],
            Opcode::Alloca { .. } | Opcode::Jmp { .. } | Opcode::Unreachable => Vec::new(),
            Opcode::Load { ptr, .. } => vec![ptr],
            Opcode::Store { value, ptr, .. } => vec![value, ptr],
            Opcode::Call { args, .. } => args.iter().map(|(_, v)| v).collect(),
            Opcode::Br { cond, .. } => vec![cond],
            Opcode::Ret { value, .. } => value.iter().collect(),
        }
    }

    /// Names of all temporaries this instruction reads
    pub fn used_temps(&self) -> Vec<&str> {
        self.operands()
            .into_iter()
            .filter_map(Value::as_temp)
            .collect()
    }

    /// Successor block labels, for terminators
    pub fn successors(&self) -> Vec<&str> {
        match &self.opcode {
            Opcode::Br {
                then_label,
                else_label,
                ..
            } => vec![then_label.as_str(), else_label.as_str()],
            Opcode::Jmp { target } => vec![target.as_str()],
            _ => Vec::new(),
        }
    }

    /// Substitute every temporary operand that appears in `map`
    pub fn replace_temps(&mut self, map: &FxHashMap<String, Value>) {
        let subst = |v: &mut Value| {
            if let Value::Temp(name) = v {
                if let Some(replacement) = map.get(name.as_str()) {
                    *v = replacement.clone();
                }
            }
        };
        match &mut self.opcode {
            Opcode::Binary { lhs, rhs, .. } | Opcode::Icmp { lhs, rhs, .. } => {
                subst(lhs);
                subst(rhs);
            }
            Opcode::Select {
                cond,
                if_true,
                if_false,
                ..
            } => {
                subst(cond);
                subst(if_true);
                subst(if_false);
            }
            Opcode::Alloca { .. } | Opcode::Jmp { .. } | Opcode::Unreachable => {}
            Opcode::Load { ptr, .. } => subst(ptr),
            Opcode::Store { value, ptr, .. } => {
                subst(value);
                subst(ptr);
            }
            Opcode::Call { args, .. } => {
                for (_, v) in args.iter_mut() {
                    subst(v);
                }
            }
            Opcode::Br { cond, .. } => subst(cond),
            Opcode::Ret { value, .. } => {
                if let Some(v) = value {
                    subst(v);
                }
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = &self.result {
            write!(f, "%{result} = ")?;
        }
        match &self.opcode {
            Opcode::Binary { op, ty, lhs, rhs } => {
                write!(f, "{} {ty} {lhs}, {rhs}", op.mnemonic())?;
            }
            Opcode::Icmp { pred, ty, lhs, rhs } => {
                write!(f, "icmp {} {ty} {lhs}, {rhs}", pred.mnemonic())?;
            }
            Opcode::Select {
                ty,
                cond,
                if_true,
                if_false,
            } => {
                write!(f, "select {ty} {cond}, {if_true}, {if_false}")?;
            }
            Opcode::Alloca { ty, count } => {
                write!(f, "alloca {ty}")?;
                if *count > 1 {
                    write!(f, ", {count}")?;
                }
            }
            Opcode::Load { ty, ptr, volatile } => {
                let vol = if *volatile { "volatile " } else { "" };
                write!(f, "load {vol}{ty}, ptr {ptr}")?;
            }
            Opcode::Store {
                ty,
                value,
                ptr,
                volatile,
            } => {
                let vol = if *volatile { "volatile " } else { "" };
                write!(f, "store {vol}{ty} {value}, ptr {ptr}")?;
            }
            Opcode::Call {
                ret_ty,
                callee,
                args,
            } => {
                write!(f, "call {ret_ty} @{callee}(")?;
                for (i, (ty, v)) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty} {v}")?;
                }
                write!(f, ")")?;
            }
            Opcode::Br {
                cond,
                then_label,
                else_label,
            } => {
                write!(f, "br i1 {cond}, label %{then_label}, label %{else_label}")?;
            }
            Opcode::Jmp { target } => {
                write!(f, "jmp label %{target}")?;
            }
            Opcode::Ret { ty, value } => match value {
                Some(v) => write!(f, "ret {ty} {v}")?,
                None => write!(f, "ret void")?,
            },
            Opcode::Unreachable => write!(f, "unreachable")?,
        }
        if let Some(loc) = &self.loc {
            write!(f, " !loc(\"{}\", {}, {})", loc.file, loc.line, loc.column)?;
        }
        Ok(())
    }
}
