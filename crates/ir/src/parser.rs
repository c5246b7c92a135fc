//! Textual IR parser
//!
//! A hand-written recursive descent over the logos token stream. The grammar
//! is line-structure free: instructions are self-delimiting, block labels are
//! recognized by `ident ':'` lookahead, and a function body ends at `}`.

use std::ops::Range;
use std::path::Path;

use logos::Logos;

use crate::lexer::Token;
use crate::{
    BinOp, Block, Context, DebugLoc, Function, IcmpPred, Instruction, Linkage, Module, Opcode,
    Param, ParseError, ParseResult, Type, Value,
};

/// Parse a module from IR text into the given context
pub fn parse_module(source: &str, ctx: &Context) -> ParseResult<Module> {
    Parser::new(source, ctx.name())?.parse_module()
}

/// Read a file and parse it as a module into the given context
pub fn parse_module_file(path: impl AsRef<Path>, ctx: &Context) -> ParseResult<Module> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_module(&source, ctx)
}

struct Parser<'a> {
    tokens: Vec<(Token<'a>, Range<usize>)>,
    pos: usize,
    source: &'a str,
    file: String,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, file: &str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for (result, span) in Token::lexer(source).spanned() {
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    let (line, column) = line_col(source, span.start);
                    return Err(ParseError::Syntax {
                        file: file.to_string(),
                        line,
                        column,
                        message: format!(
                            "unrecognized token '{}'",
                            &source[span.start..span.end.min(source.len())]
                        ),
                    });
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            source,
            file: file.to_string(),
        })
    }

    // --- Cursor ---

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| *t);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(self.source.len(), |(_, span)| span.start);
        let (line, column) = line_col(self.source, offset);
        ParseError::Syntax {
            file: self.file.clone(),
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token<'a>, what: &str) -> ParseResult<()> {
        match self.peek() {
            Some(token) if *token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(self.error(format!("expected {what}, found {}", token.describe()))),
            None => Err(self.error(format!("expected {what}, found end of input"))),
        }
    }

    // --- Grammar ---

    fn parse_module(mut self) -> ParseResult<Module> {
        let mut module = Module::new();
        while !self.at_eof() {
            let function = self.parse_item()?;
            if module.contains_function(&function.name) {
                return Err(self.error(format!("duplicate function '@{}'", function.name)));
            }
            module.add_function(function);
        }
        Ok(module)
    }

    fn parse_item(&mut self) -> ParseResult<Function> {
        match self.peek() {
            Some(Token::Declare) => {
                self.pos += 1;
                let mut function = self.parse_header()?;
                function.is_declaration = true;
                Ok(function)
            }
            Some(Token::Fn | Token::Internal) => {
                let mut function = self.parse_header()?;
                self.expect(Token::LBrace, "'{'")?;
                self.parse_body(&mut function)?;
                self.expect(Token::RBrace, "'}'")?;
                Ok(function)
            }
            Some(token) => {
                Err(self.error(format!("expected function, found {}", token.describe())))
            }
            None => Err(self.error("expected function, found end of input")),
        }
    }

    fn parse_header(&mut self) -> ParseResult<Function> {
        let linkage = if matches!(self.peek(), Some(Token::Internal)) {
            self.pos += 1;
            Linkage::Internal
        } else {
            Linkage::External
        };
        self.expect(Token::Fn, "'fn'")?;
        let name = match self.bump() {
            Some(Token::Global(name)) => name.to_string(),
            _ => return Err(self.error("expected function name ('@name')")),
        };
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                let ty = self.parse_type()?;
                let param = match self.bump() {
                    Some(Token::Local(name)) => Param {
                        ty,
                        name: name.to_string(),
                    },
                    _ => return Err(self.error("expected parameter name ('%name')")),
                };
                params.push(param);
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'")?;
        self.expect(Token::Arrow, "'->'")?;
        let ret_ty = self.parse_type()?;

        let mut function = Function::new(name, ret_ty);
        function.linkage = linkage;
        function.params = params;
        while matches!(self.peek(), Some(Token::Bang)) {
            self.pos += 1;
            match self.bump() {
                Some(Token::Ident(attr)) => function.attributes.push(attr.to_string()),
                _ => return Err(self.error("expected attribute name after '!'")),
            }
        }
        Ok(function)
    }

    fn parse_body(&mut self, function: &mut Function) -> ParseResult<()> {
        // The entry block may be unlabeled; every further block needs a label.
        let mut first = true;
        while !matches!(self.peek(), Some(Token::RBrace) | None) {
            let name = if self.at_block_label() {
                match self.bump() {
                    Some(Token::Ident(name)) => {
                        self.pos += 1; // colon
                        Some(name.to_string())
                    }
                    _ => unreachable!("at_block_label checked the shape"),
                }
            } else if first {
                None
            } else {
                return Err(self.error("expected block label"));
            };
            first = false;

            let mut block = Block::new(name);
            loop {
                block.push(self.parse_instruction()?);
                if matches!(self.peek(), Some(Token::RBrace) | None) || self.at_block_label() {
                    break;
                }
            }
            function.add_block(block);
        }
        if function.blocks.is_empty() {
            return Err(self.error(format!("function '@{}' has an empty body", function.name)));
        }
        Ok(())
    }

    fn at_block_label(&self) -> bool {
        matches!(self.peek(), Some(Token::Ident(_))) && matches!(self.peek2(), Some(Token::Colon))
    }

    fn parse_instruction(&mut self) -> ParseResult<Instruction> {
        let result = if matches!(self.peek(), Some(Token::Local(_)))
            && matches!(self.peek2(), Some(Token::Assign))
        {
            match self.bump() {
                Some(Token::Local(name)) => {
                    self.pos += 1; // '='
                    Some(name.to_string())
                }
                _ => unreachable!("peek checked the shape"),
            }
        } else {
            None
        };

        let opcode = self.parse_opcode(result.is_some())?;
        let mut instruction = Instruction::new(result, opcode);
        if matches!(self.peek(), Some(Token::Bang)) {
            instruction.loc = Some(self.parse_loc_suffix()?);
        }
        Ok(instruction)
    }

    fn parse_opcode(&mut self, has_result: bool) -> ParseResult<Opcode> {
        let token = match self.peek() {
            Some(token) => *token,
            None => return Err(self.error("expected instruction, found end of input")),
        };

        let needs_result = matches!(
            token,
            Token::Add
                | Token::Sub
                | Token::Mul
                | Token::Div
                | Token::And
                | Token::Or
                | Token::Xor
                | Token::Shl
                | Token::Shr
                | Token::Icmp
                | Token::Select
                | Token::Alloca
                | Token::Load
        );
        if needs_result && !has_result {
            return Err(self.error(format!("{} requires a result name", token.describe())));
        }
        let forbids_result = matches!(
            token,
            Token::Store | Token::Br | Token::Jmp | Token::Ret | Token::Unreachable
        );
        if forbids_result && has_result {
            return Err(self.error(format!("{} cannot define a result", token.describe())));
        }
        if !needs_result && !forbids_result && !matches!(token, Token::Call) {
            return Err(self.error(format!(
                "expected instruction, found {}",
                token.describe()
            )));
        }

        self.pos += 1;
        match token {
            Token::Add => self.parse_binary(BinOp::Add),
            Token::Sub => self.parse_binary(BinOp::Sub),
            Token::Mul => self.parse_binary(BinOp::Mul),
            Token::Div => self.parse_binary(BinOp::Div),
            Token::And => self.parse_binary(BinOp::And),
            Token::Or => self.parse_binary(BinOp::Or),
            Token::Xor => self.parse_binary(BinOp::Xor),
            Token::Shl => self.parse_binary(BinOp::Shl),
            Token::Shr => self.parse_binary(BinOp::Shr),
            Token::Icmp => {
                let pred = match self.bump() {
                    Some(Token::Ident(name)) => parse_pred(name)
                        .ok_or_else(|| self.error(format!("unknown icmp predicate '{name}'")))?,
                    _ => return Err(self.error("expected icmp predicate")),
                };
                let ty = self.parse_type()?;
                let lhs = self.parse_value()?;
                self.expect(Token::Comma, "','")?;
                let rhs = self.parse_value()?;
                Ok(Opcode::Icmp { pred, ty, lhs, rhs })
            }
            Token::Select => {
                let ty = self.parse_type()?;
                let cond = self.parse_value()?;
                self.expect(Token::Comma, "','")?;
                let if_true = self.parse_value()?;
                self.expect(Token::Comma, "','")?;
                let if_false = self.parse_value()?;
                Ok(Opcode::Select {
                    ty,
                    cond,
                    if_true,
                    if_false,
                })
            }
            Token::Alloca => {
                let ty = self.parse_type()?;
                let count = if matches!(self.peek(), Some(Token::Comma)) {
                    self.pos += 1;
                    match self.bump() {
                        Some(Token::Int(v)) if v > 0 => u32::try_from(v)
                            .map_err(|_| self.error("alloca count out of range"))?,
                        _ => return Err(self.error("expected positive alloca count")),
                    }
                } else {
                    1
                };
                Ok(Opcode::Alloca { ty, count })
            }
            Token::Load => {
                let volatile = self.eat_volatile();
                let ty = self.parse_type()?;
                self.expect(Token::Comma, "','")?;
                self.expect(Token::Ptr, "'ptr'")?;
                let ptr = self.parse_value()?;
                Ok(Opcode::Load { ty, ptr, volatile })
            }
            Token::Store => {
                let volatile = self.eat_volatile();
                let ty = self.parse_type()?;
                let value = self.parse_value()?;
                self.expect(Token::Comma, "','")?;
                self.expect(Token::Ptr, "'ptr'")?;
                let ptr = self.parse_value()?;
                Ok(Opcode::Store {
                    ty,
                    value,
                    ptr,
                    volatile,
                })
            }
            Token::Call => {
                let ret_ty = self.parse_type()?;
                let callee = match self.bump() {
                    Some(Token::Global(name)) => name.to_string(),
                    _ => return Err(self.error("expected callee ('@name')")),
                };
                self.expect(Token::LParen, "'('")?;
                let mut args = Vec::new();
                if !matches!(self.peek(), Some(Token::RParen)) {
                    loop {
                        let ty = self.parse_type()?;
                        let value = self.parse_value()?;
                        args.push((ty, value));
                        if matches!(self.peek(), Some(Token::Comma)) {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
                self.expect(Token::RParen, "')'")?;
                if ret_ty.is_void() && has_result {
                    return Err(self.error("void call cannot define a result"));
                }
                Ok(Opcode::Call {
                    ret_ty,
                    callee,
                    args,
                })
            }
            Token::Br => {
                self.expect(Token::I1, "'i1'")?;
                let cond = self.parse_value()?;
                self.expect(Token::Comma, "','")?;
                let then_label = self.parse_label_ref()?;
                self.expect(Token::Comma, "','")?;
                let else_label = self.parse_label_ref()?;
                Ok(Opcode::Br {
                    cond,
                    then_label,
                    else_label,
                })
            }
            Token::Jmp => {
                let target = self.parse_label_ref()?;
                Ok(Opcode::Jmp { target })
            }
            Token::Ret => {
                if matches!(self.peek(), Some(Token::Void)) {
                    self.pos += 1;
                    Ok(Opcode::Ret {
                        ty: Type::Void,
                        value: None,
                    })
                } else {
                    let ty = self.parse_type()?;
                    let value = self.parse_value()?;
                    Ok(Opcode::Ret {
                        ty,
                        value: Some(value),
                    })
                }
            }
            Token::Unreachable => Ok(Opcode::Unreachable),
            _ => unreachable!("instruction tokens are filtered above"),
        }
    }

    fn parse_binary(&mut self, op: BinOp) -> ParseResult<Opcode> {
        let ty = self.parse_type()?;
        let lhs = self.parse_value()?;
        self.expect(Token::Comma, "','")?;
        let rhs = self.parse_value()?;
        Ok(Opcode::Binary { op, ty, lhs, rhs })
    }

    fn eat_volatile(&mut self) -> bool {
        if matches!(self.peek(), Some(Token::Volatile)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> ParseResult<Type> {
        let ty = match self.peek() {
            Some(Token::Void) => Type::Void,
            Some(Token::I1) => Type::I1,
            Some(Token::I8) => Type::I8,
            Some(Token::I16) => Type::I16,
            Some(Token::I32) => Type::I32,
            Some(Token::I64) => Type::I64,
            Some(Token::F32) => Type::F32,
            Some(Token::F64) => Type::F64,
            Some(Token::Ptr) => Type::Ptr,
            Some(token) => {
                return Err(self.error(format!("expected type, found {}", token.describe())))
            }
            None => return Err(self.error("expected type, found end of input")),
        };
        self.pos += 1;
        Ok(ty)
    }

    fn parse_value(&mut self) -> ParseResult<Value> {
        match self.bump() {
            Some(Token::Local(name)) => Ok(Value::Temp(name.to_string())),
            Some(Token::Global(name)) => Ok(Value::Global(name.to_string())),
            Some(Token::Int(v)) => Ok(Value::Int(v)),
            Some(token) => {
                self.pos -= 1;
                Err(self.error(format!("expected value, found {}", token.describe())))
            }
            None => Err(self.error("expected value, found end of input")),
        }
    }

    fn parse_label_ref(&mut self) -> ParseResult<String> {
        self.expect(Token::Label, "'label'")?;
        match self.bump() {
            Some(Token::Local(name)) => Ok(name.to_string()),
            _ => Err(self.error("expected block label ('%name')")),
        }
    }

    fn parse_loc_suffix(&mut self) -> ParseResult<DebugLoc> {
        self.expect(Token::Bang, "'!'")?;
        match self.bump() {
            Some(Token::Ident("loc")) => {}
            _ => return Err(self.error("expected 'loc' after '!'")),
        }
        self.expect(Token::LParen, "'('")?;
        let file = match self.bump() {
            Some(Token::Str(s)) => s.to_string(),
            _ => return Err(self.error("expected file name string in !loc")),
        };
        self.expect(Token::Comma, "','")?;
        let line = self.parse_u32("line number")?;
        self.expect(Token::Comma, "','")?;
        let column = self.parse_u32("column number")?;
        self.expect(Token::RParen, "')'")?;
        Ok(DebugLoc { file, line, column })
    }

    fn parse_u32(&mut self, what: &str) -> ParseResult<u32> {
        match self.bump() {
            Some(Token::Int(v)) if v >= 0 => {
                u32::try_from(v).map_err(|_| self.error(format!("{what} out of range")))
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }
}

fn parse_pred(name: &str) -> Option<IcmpPred> {
    match name {
        "eq" => Some(IcmpPred::Eq),
        "ne" => Some(IcmpPred::Ne),
        "slt" => Some(IcmpPred::Slt),
        "sle" => Some(IcmpPred::Sle),
        "sgt" => Some(IcmpPred::Sgt),
        "sge" => Some(IcmpPred::Sge),
        _ => None,
    }
}

/// 1-based line and column for a byte offset
fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(source.len());
    let mut line = 1u32;
    let mut column = 1u32;
    for ch in source[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        let ctx = Context::new("<test>");
        parse_module(source, &ctx).expect("parse failed")
    }

    #[test]
    fn parses_a_two_block_function() {
        let module = parse(
            r#"
            fn @clamp(i32 %x) -> i32 {
            entry:
              %neg = icmp slt i32 %x, 0
              br i1 %neg, label %zero, label %keep
            zero:
              ret i32 0
            keep:
              ret i32 %x
            }
            "#,
        );
        let func = module.get_function("clamp").expect("missing @clamp");
        assert_eq!(func.block_count(), 3);
        assert_eq!(func.instruction_count(), 5);
        assert_eq!(func.blocks[crate::BlockId::from(0usize)].name.as_deref(), Some("entry"));
    }

    #[test]
    fn entry_block_label_is_optional() {
        let module = parse("fn @f() -> void {\n  ret void\n}");
        let func = module.get_function("f").unwrap();
        assert_eq!(func.blocks[crate::BlockId::from(0usize)].name, None);
    }

    #[test]
    fn parses_declarations_and_attributes() {
        let module = parse(
            "declare fn @escape(ptr %p) -> void\n\
             internal fn @square(i32 %x) -> i32 !noinline {\n  %r = mul i32 %x, %x\n  ret i32 %r\n}",
        );
        let escape = module.get_function("escape").unwrap();
        assert!(escape.is_declaration);
        let square = module.get_function("square").unwrap();
        assert_eq!(square.linkage, Linkage::Internal);
        assert!(square.has_attribute("noinline"));
    }

    #[test]
    fn parses_debug_locations() {
        let module = parse(
            "fn @f(ptr %p) -> void {\n  store i32 1, ptr %p !loc(\"cases.c\", 3, 5)\n  ret void\n}",
        );
        let func = module.get_function("f").unwrap();
        let loc = func.blocks[crate::BlockId::from(0usize)].instructions[0]
            .loc
            .as_ref()
            .expect("missing !loc");
        assert_eq!(loc.format(), "cases.c:3:5");
    }

    #[test]
    fn print_parse_round_trip_is_stable() {
        let source = "fn @f(i32 %a, i32 %b) -> i32 {\nentry:\n  %sum = add i32 %a, %b\n  %big = icmp sgt i32 %sum, 100\n  br i1 %big, label %clip, label %done\nclip:\n  ret i32 100\ndone:\n  ret i32 %sum\n}\n";
        let printed = parse(source).print_to_string();
        let reparsed = parse(&printed).print_to_string();
        assert_eq!(printed, reparsed);
    }

    #[test]
    fn rejects_duplicate_functions() {
        let ctx = Context::new("<test>");
        let err = parse_module(
            "fn @f() -> void {\n ret void\n}\nfn @f() -> void {\n ret void\n}",
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate function"));
    }

    #[test]
    fn reports_syntax_error_position() {
        let ctx = Context::new("input.air");
        let err = parse_module("fn @f() -> i32 {\n  %x = frobnicate\n}", &ctx).unwrap_err();
        match err {
            ParseError::Syntax { file, line, .. } => {
                assert_eq!(file, "input.air");
                assert_eq!(line, 2);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let ctx = Context::new("nope");
        let err = parse_module_file("/nonexistent/input.air", &ctx).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
