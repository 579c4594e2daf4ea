//! Cacheline predecode.
//!
//! One predecoder per cacheline word extracts early hints about control
//! flow: whether the encoding looks valid, whether it is a control-flow
//! instruction, its class under the RISC-V link-register conventions, and
//! the target address when it is computable from the encoding alone.
//!
//! Call and return classification follows the ISA's hints: `x1` and `x5`
//! are link registers; `JAL`/`JALR` writing a link register is a call, and
//! `JALR x0, lr, imm` is a return.
//!
//! Predecode is a pure function of the word and its program counter; the
//! line-level helpers only select which words participate.

use crate::common::{VirtAddr, priority_encode};
use crate::front::signals::{ControlFlowOp, PdInfo};
use crate::riscv::encoding::{
    self, OPCODE_LOW_32, imm_b, imm_i, imm_j, is_link_reg, opcodes,
};

/// Predecodes a single RV32 instruction word at `pc`.
pub fn predecode_word(inst: u32, pc: VirtAddr) -> PdInfo {
    let rd = encoding::rd(inst);
    let rs1 = encoding::rs1(inst);
    let ill = encoding::opcode_low(inst) != OPCODE_LOW_32;
    let write_lr = is_link_reg(rd);
    let read_lr = is_link_reg(rs1);

    let mut info = PdInfo {
        ill,
        rd,
        rs1,
        ..PdInfo::default()
    };

    match encoding::opcode(inst) {
        opcodes::BRANCH => {
            let imm = imm_b(inst);
            info.is_cf = true;
            info.cf_op = ControlFlowOp::Branch;
            info.imm = imm;
            info.tgt = VirtAddr(pc.val().wrapping_add(imm as u32));
            info.tgt_valid = true;
        }
        opcodes::JAL => {
            let imm = imm_j(inst);
            info.is_cf = true;
            info.cf_op = if write_lr {
                ControlFlowOp::CallDir
            } else {
                ControlFlowOp::JumpDir
            };
            info.imm = imm;
            info.tgt = VirtAddr(pc.val().wrapping_add(imm as u32));
            info.tgt_valid = true;
        }
        opcodes::JALR => {
            info.is_cf = true;
            info.cf_op = if read_lr && rd == 0 {
                ControlFlowOp::Ret
            } else if write_lr {
                ControlFlowOp::CallInd
            } else {
                ControlFlowOp::JumpInd
            };
            // Target depends on rs1, unknown this early.
            info.imm = imm_i(inst);
        }
        _ => {}
    }

    info
}

/// Predecodes every word of a cacheline.
///
/// `base` is the cacheline-aligned address of `line`; only the words whose
/// bit is set in `mask` participate, the rest report a default (invalid)
/// record. This mirrors the entry-point masking of the first line of a
/// fetch transaction.
pub fn predecode_line(line: &[u32], base: VirtAddr, mask: u32) -> Vec<PdInfo> {
    line.iter()
        .enumerate()
        .map(|(idx, &word)| {
            if mask & (1 << idx) != 0 {
                predecode_word(word, VirtAddr(base.val().wrapping_add((idx * 4) as u32)))
            } else {
                PdInfo::default()
            }
        })
        .collect()
}

/// Finds the first control-flow instruction among the masked words.
///
/// Illegal-looking words are skipped: an invalid encoding must not redirect
/// fetch, it propagates downstream for architectural handling.
pub fn first_control_flow(infos: &[PdInfo], mask: u32) -> Option<usize> {
    let mut cf_bits = 0u32;
    for (idx, info) in infos.iter().enumerate() {
        if mask & (1 << idx) != 0 && info.is_cf && !info.ill {
            cf_bits |= 1 << idx;
        }
    }
    priority_encode(cf_bits)
}
