//! Functions
//!
//! A function is a CFG of basic blocks plus the header information the
//! structural differ compares: printed signature, linkage and the attribute
//! list. Declarations carry a header and no blocks.

use index_vec::IndexVec;

use crate::{indent_str, Block, BlockId, PrettyPrint, Type};

/// Symbol linkage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Linkage {
    /// Visible outside the module (the default)
    #[default]
    External,
    /// Local to the module, printed as `internal`
    Internal,
}

impl Linkage {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::External => "",
            Self::Internal => "internal ",
        }
    }
}

/// A formal parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

/// A function definition or declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub linkage: Linkage,
    pub params: Vec<Param>,
    pub ret_ty: Type,
    /// Attribute markers from `!name` annotations, e.g. `noinline`, `optnone`
    pub attributes: Vec<String>,
    pub blocks: IndexVec<BlockId, Block>,
    pub is_declaration: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, ret_ty: Type) -> Self {
        Self {
            name: name.into(),
            linkage: Linkage::External,
            params: Vec::new(),
            ret_ty,
            attributes: Vec::new(),
            blocks: IndexVec::new(),
            is_declaration: false,
        }
    }

    pub fn add_block(&mut self, block: Block) -> BlockId {
        self.blocks.push(block)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total instruction count across all blocks
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(Block::instruction_count).sum()
    }

    /// The printed signature used for signature-change detection
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.ty.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} : fn({}) -> {}", self.name, params, self.ret_ty)
    }

    /// The printed attribute list used for attribute-change detection
    pub fn attribute_string(&self) -> String {
        self.attributes.join(" ")
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Give every unnamed block a synthetic `<prefix>.<index>` name
    ///
    /// The index is the block's position in the function, counted over all
    /// blocks so names stay aligned with block positions.
    pub fn name_anonymous_blocks(&mut self, prefix: &str) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            if block.name.is_none() {
                block.name = Some(format!("{prefix}.{index}"));
            }
        }
    }

    fn header(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| format!("{} %{}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut header = format!(
            "{}fn @{}({}) -> {}",
            self.linkage.keyword(),
            self.name,
            params,
            self.ret_ty
        );
        for attr in &self.attributes {
            header.push_str(&format!(" !{attr}"));
        }
        header
    }
}

impl PrettyPrint for Function {
    fn pretty_print(&self, indent: usize) -> String {
        let base = indent_str(indent);
        if self.is_declaration {
            return format!("{}declare {}\n", base, self.header());
        }
        let mut result = format!("{}{} {{\n", base, self.header());
        for block in &self.blocks {
            result.push_str(&block.pretty_print(indent));
        }
        result.push_str(&format!("{base}}}\n"));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Instruction, Opcode};

    #[test]
    fn signature_includes_param_types_only() {
        let mut func = Function::new("square", Type::I32);
        func.params.push(Param {
            ty: Type::I32,
            name: "x".into(),
        });
        assert_eq!(func.signature(), "square : fn(i32) -> i32");
    }

    #[test]
    fn anonymous_blocks_get_positional_names() {
        let mut func = Function::new("f", Type::Void);
        func.add_block(Block::new(None));
        func.add_block(Block::new(Some("exit".into())));
        func.name_anonymous_blocks("aion.bb");
        assert_eq!(func.blocks[BlockId::from(0usize)].name.as_deref(), Some("aion.bb.0"));
        assert_eq!(func.blocks[BlockId::from(1usize)].name.as_deref(), Some("exit"));
    }

    #[test]
    fn instruction_count_sums_blocks() {
        let mut func = Function::new("f", Type::Void);
        let mut block = Block::new(Some("entry".into()));
        block.push(Instruction::new(
            None,
            Opcode::Ret {
                ty: Type::Void,
                value: None,
            },
        ));
        func.add_block(block);
        assert_eq!(func.instruction_count(), 1);
    }
}
