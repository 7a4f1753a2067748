//! Label listing and label cleanup

use crate::assembly::{Instruction, JumpTarget, MethodBody};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Jump reference to a label.
///
/// Labels are stored without their trailing `:`, so the partial name a
/// conditional jump carries is the same string as the full reference of an
/// unconditional one and a single rewrite covers both. `conditional` marks
/// jumps whose label stands in for argument 1 rather than argument 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef {
    pub label: String,
    pub conditional: bool,
}

/// One row of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Label(String),
    Instruction {
        /// Mnemonic and operands, without the jump label
        text: String,
        jump: Option<LabelRef>,
    },
}

impl Row {
    pub fn is_label(&self) -> bool {
        matches!(self, Row::Label(_))
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::Label(name) => write!(f, "{}:", name),
            Row::Instruction { text, jump: None } => write!(f, "{}", text),
            Row::Instruction {
                text,
                jump: Some(jump),
            } => write!(f, "{} {}", text, jump.label),
        }
    }
}

/// Label-annotated text listing of one method
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub method: String,
    pub rows: Vec<Row>,
}

impl Listing {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            rows: Vec::new(),
        }
    }

    pub fn label_name(position: impl fmt::Display) -> String {
        format!("_label{}", position)
    }

    pub fn push_label(&mut self, name: impl Into<String>) {
        self.rows.push(Row::Label(name.into()));
    }

    /// Append an instruction row, pointing jumps at `label` when given
    pub fn push_instruction(&mut self, instr: &Instruction, label: Option<String>) {
        let text = instruction_text(instr);
        let jump = label.map(|label| LabelRef {
            label,
            conditional: instr.opcode.jump_argument_index() == Some(1),
        });
        self.rows.push(Row::Instruction { text, jump });
    }

    /// Listing of a resolved body with a label before every instruction
    pub fn from_body(body: &MethodBody) -> Self {
        let mut listing = Listing::new(body.owner.clone());
        for (i, instr) in body.instructions.iter().enumerate() {
            listing.push_label(Self::label_name(i));
            let label = match instr.target {
                Some(JumpTarget::Instruction(target)) => Some(Self::label_name(target)),
                Some(JumpTarget::Source(offset)) => Some(Self::label_name(offset)),
                None => None,
            };
            listing.push_instruction(instr, label);
        }
        listing.push_label(Self::label_name(body.instructions.len()));
        listing
    }

    /// Labels referenced by at least one jump
    pub fn used_labels(&self) -> HashSet<&str> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Instruction {
                    jump: Some(jump), ..
                } => Some(jump.label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drop every label no jump refers to. Returns the number removed.
    pub fn remove_unused_labels(&mut self) -> usize {
        let used: HashSet<String> = self.used_labels().into_iter().map(String::from).collect();
        let before = self.rows.len();
        self.rows.retain(|row| match row {
            Row::Label(name) => used.contains(name),
            _ => true,
        });
        before - self.rows.len()
    }

    /// Collapse consecutive label rows into the first of each run, rewriting
    /// jump references. Returns the number removed.
    pub fn collapse_redundant_labels(&mut self) -> usize {
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut kept = Vec::with_capacity(self.rows.len());
        let mut canonical: Option<String> = None;

        for row in self.rows.drain(..) {
            match row {
                Row::Label(name) => match &canonical {
                    Some(first) => {
                        aliases.insert(name, first.clone());
                    }
                    None => {
                        canonical = Some(name.clone());
                        kept.push(Row::Label(name));
                    }
                },
                other => {
                    canonical = None;
                    kept.push(other);
                }
            }
        }

        for row in &mut kept {
            if let Row::Instruction {
                jump: Some(jump), ..
            } = row
            {
                if let Some(target) = aliases.get(&jump.label) {
                    jump.label = target.clone();
                }
            }
        }

        self.rows = kept;
        aliases.len()
    }

    /// Run both label passes
    pub fn optimize(&mut self) -> usize {
        self.remove_unused_labels() + self.collapse_redundant_labels()
    }

    /// Render as a `.code` block
    pub fn render(&self) -> String {
        let mut out = String::from(".code\n");
        for row in &self.rows {
            match row {
                Row::Label(_) => out.push_str(&format!("  {}\n", row)),
                _ => out.push_str(&format!("    {}\n", row)),
            }
        }
        out.push_str(".endCode\n");
        out
    }
}

fn instruction_text(instr: &Instruction) -> String {
    let skip = instr.opcode.jump_argument_index();
    let mut text = instr.opcode.mnemonic().to_string();
    for (i, arg) in instr.arguments.iter().enumerate() {
        if Some(i) == skip {
            continue;
        }
        text.push(' ');
        text.push_str(&arg.to_string());
    }
    for arg in &instr.variable_arguments {
        text.push(' ');
        text.push_str(&arg.to_string());
    }
    text
}
