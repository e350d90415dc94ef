use crate::command::SpecialCommand;
use crate::config::ListingConfig;
use crate::context::SymbolContext;
use crate::instruction::Instruction;
use crate::program::Program;
use crate::tables::MviDestination;

const TAB_STOP: usize = 8;

/// Append `cell` and enough tabs to reach the next column boundary.
fn pad_cell(out: &mut String, cell: &str, width: usize) {
    out.push_str(cell);
    let mut col = cell.len();
    loop {
        col = (col / TAB_STOP + 1) * TAB_STOP;
        out.push('\t');
        if col >= width {
            break;
        }
    }
}

fn label_for(ctx: &SymbolContext, index: usize) -> Option<&str> {
    ctx.labels_at(index).into_iter().next()
}

fn fmt_special(cmd: &SpecialCommand, ctx: &SymbolContext) -> String {
    match cmd {
        SpecialCommand::Jump(j) => match label_for(ctx, j.target as usize) {
            Some(l) => j.render_with_target(l),
            None => cmd.render().join(" "),
        },
        SpecialCommand::Mvi(m) if m.destination == MviDestination::Pc => {
            match usize::try_from(m.immediate).ok().and_then(|i| label_for(ctx, i)) {
                Some(l) => m.render_with_target(l),
                None => cmd.render().join(" "),
            }
        }
        _ => cmd.render().join(" "),
    }
}

/// One listing row. Compound slots are laid out in ALU, X, Y, D1 columns.
pub fn fmt_instruction(instr: &Instruction, ctx: &SymbolContext, cfg: &ListingConfig) -> String {
    match instr {
        Instruction::Special(cmd) => fmt_special(cmd, ctx),
        Instruction::Compound(slots) => {
            let cells = slots.render();
            let mut row = String::new();
            for (i, cell) in cells.iter().enumerate() {
                if i + 1 == cells.len() {
                    row.push_str(cell);
                } else {
                    pad_cell(&mut row, cell, cfg.column_width);
                }
            }
            row
        }
    }
}

/// The full listing: label lines ahead of the instruction they name.
pub fn fmt_program(program: &Program, cfg: &ListingConfig) -> String {
    let ctx = program.context();
    let mut out = String::new();
    for (index, instr) in program.instructions().iter().enumerate() {
        for name in ctx.labels_at(index) {
            out.push_str(name);
            out.push_str(":\n");
        }
        out.push_str(&fmt_instruction(instr, ctx, cfg));
        out.push('\n');
    }
    // Labels that point one past the last instruction.
    for name in ctx.labels_at(program.len()) {
        out.push_str(name);
        out.push_str(":\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_pad_to_the_column_width() {
        let mut row = String::new();
        pad_cell(&mut row, "AD2", 16);
        assert_eq!(row, "AD2\t\t");
        let mut row = String::new();
        pad_cell(&mut row, "MOV RAM0,X", 16);
        assert_eq!(row, "MOV RAM0,X\t");
        let mut row = String::new();
        pad_cell(&mut row, "MOV #255,WA0 xyz", 16);
        assert_eq!(row, "MOV #255,WA0 xyz\t");
    }

    #[test]
    fn compound_rows_have_four_columns() {
        let instr = Instruction::default();
        let row = fmt_instruction(&instr, &SymbolContext::new(), &ListingConfig::default());
        assert_eq!(row, "NOP\t\tNOP\t\tNOP\t\tNOP");
    }
}
