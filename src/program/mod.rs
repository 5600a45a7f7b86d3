//! Program representation and instruction decoding
//!
//! A program is consumed character by character; there is no tokenizer.
//! Every character that is not an instruction in the active [`Dialect`] decodes
//! to [`Instruction::Comment`] and executes as a no-op.
//!
//! - [`jump_map`]: bracket matching, run once per program at load time

pub mod jump_map;

pub use jump_map::JumpMap;

/// Which instruction set is recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `+ - > < [ ] , .` (batch interpreter)
    Classic,
    /// Classic plus `:` (secondary output) and `@` (breakpoint)
    Extended,
}

/// A single decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Increment,
    Decrement,
    MoveRight,
    MoveLeft,
    LoopStart,
    LoopEnd,
    Read,
    Write,
    WriteSecondary,
    Breakpoint,
    Comment,
}

impl Instruction {
    pub fn decode(c: char, dialect: Dialect) -> Self {
        match c {
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '>' => Instruction::MoveRight,
            '<' => Instruction::MoveLeft,
            '[' => Instruction::LoopStart,
            ']' => Instruction::LoopEnd,
            ',' => Instruction::Read,
            '.' => Instruction::Write,
            ':' if dialect == Dialect::Extended => Instruction::WriteSecondary,
            '@' if dialect == Dialect::Extended => Instruction::Breakpoint,
            _ => Instruction::Comment,
        }
    }
}

/// An immutable program, indexed by character position from 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    chars: Vec<char>,
}

impl Program {
    pub fn new(source: &str) -> Self {
        Program {
            chars: source.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at `index`, `None` past the end
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Decode the instruction at `index`
    pub fn instruction_at(&self, index: usize, dialect: Dialect) -> Option<Instruction> {
        self.char_at(index).map(|c| Instruction::decode(c, dialect))
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of characters that are real instructions under `dialect`
    pub fn instruction_count(&self, dialect: Dialect) -> usize {
        self.chars
            .iter()
            .filter(|&&c| Instruction::decode(c, dialect) != Instruction::Comment)
            .count()
    }
}

impl From<&str> for Program {
    fn from(source: &str) -> Self {
        Program::new(source)
    }
}
