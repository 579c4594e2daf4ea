//! Inter-unit request and response bundles.
//!
//! These structures are the payloads carried on the registered buses between
//! front-end components. Cross-references between components are always FTQ
//! or MSHR *indices*, never pointers: the authoritative state for a fetch
//! transaction lives in its FTQ slot.

use crate::common::{PhysAddr, VirtAddr};
use crate::riscv::paging::{Pte, Vpn};

/// Index of an FTQ entry.
pub type FtqIndex = usize;

/// One cacheline of instruction words.
pub type CacheLine = Vec<u32>;

/// Control-flow operation classes recognised by predecode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlFlowOp {
    /// Not a control-flow instruction.
    #[default]
    None,
    /// Conditional branch.
    Branch,
    /// Direct unconditional jump (JAL, no link write).
    JumpDir,
    /// Indirect jump (JALR, no link semantics).
    JumpInd,
    /// Direct call (JAL writing a link register).
    CallDir,
    /// Indirect call (JALR writing a link register).
    CallInd,
    /// Return (JALR reading a link register into `x0`).
    Ret,
}

impl ControlFlowOp {
    /// Whether predecode alone resolves the target and may redirect fetch.
    ///
    /// Branches are excluded: nothing in the encoding says whether a branch
    /// should default to taken, so predecode only validates their existence.
    #[inline]
    pub const fn resteerable(self) -> bool {
        matches!(self, Self::JumpDir | Self::CallDir | Self::Ret)
    }
}

/// Predecode output for one instruction word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PdInfo {
    /// The encoding is not a valid 32-bit instruction.
    pub ill: bool,
    /// The word is a control-flow instruction.
    pub is_cf: bool,
    /// Control-flow class.
    pub cf_op: ControlFlowOp,
    /// Destination register field.
    pub rd: u32,
    /// First source register field.
    pub rs1: u32,
    /// Sign-extended immediate.
    pub imm: i32,
    /// Computed target (`pc + imm`) for direct jumps and branches.
    pub tgt: VirtAddr,
    /// The target field is meaningful.
    pub tgt_valid: bool,
}

/// Status of an access through the demand or prefetch pipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchStatus {
    /// No access occurred.
    #[default]
    None,
    /// Hit in the L1I cache.
    L1Hit,
    /// Missed in the L1I cache.
    L1Miss,
    /// Missed in the L1I TLB.
    TlbMiss,
}

/// Where a fill request originated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillSource {
    /// Demand fetch stalled on this line.
    #[default]
    Demand,
    /// Prefetch probe missed on this line.
    Prefetch,
}

/// FTQ allocation request, produced by the control-flow controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocRequest {
    /// Program counter of the first instruction in the transaction.
    pub vaddr: VirtAddr,
    /// Treat the address as physical (bypass translation).
    pub passthru: bool,
    /// Sequential cachelines in this transaction.
    pub lines: u32,
    /// The address came from a speculative predictor.
    pub predicted: bool,
}

/// Demand fetch request, FTQ to demand fetch unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Program counter of the first fetched instruction.
    pub vaddr: VirtAddr,
    /// Bypass virtual-to-physical translation.
    pub passthru: bool,
    /// Sequential cachelines in this transaction.
    pub lines: u32,
    /// Originating FTQ entry.
    pub ftq_idx: FtqIndex,
}

/// Demand fetch response, demand fetch unit to FTQ.
///
/// Per-line misses report `L1Miss`/`TlbMiss` with the fetch pointer
/// unmoved; the single `L1Hit` response per transaction reports completion
/// (possibly early, via `resteer`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemandResponse {
    /// Originating FTQ entry; always the current fetch pointer.
    pub ftq_idx: FtqIndex,
    /// Address of the line the response describes.
    pub vaddr: VirtAddr,
    /// Access outcome.
    pub sts: FetchStatus,
    /// The transaction ended early at a predecoded redirect.
    pub resteer: bool,
}

/// Prefetch probe request, FTQ to prefetch unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefetchRequest {
    /// Address of the cacheline to probe.
    pub vaddr: VirtAddr,
    /// Bypass virtual-to-physical translation.
    pub passthru: bool,
    /// Originating FTQ entry.
    pub ftq_idx: FtqIndex,
}

/// Prefetch probe response, prefetch unit to FTQ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Originating FTQ entry.
    pub ftq_idx: FtqIndex,
    /// Address of the probed line.
    pub vaddr: VirtAddr,
    /// Probe outcome.
    pub sts: FetchStatus,
}

/// L1I fill request to the fill arbiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillRequest {
    /// Physical address of the first missing line.
    pub addr: PhysAddr,
    /// Number of sequential lines still wanted by the transaction.
    pub lines: u32,
    /// Originating FTQ entry.
    pub ftq_idx: FtqIndex,
    /// Demand or prefetch origin; preserved through to the response.
    pub src: FillSource,
}

/// Fill completion, fill unit to FTQ (and observed by the stalled demand
/// pipe).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillResponse {
    /// FTQ entry whose miss this fill serviced.
    pub ftq_idx: FtqIndex,
    /// Origin of the original request.
    pub src: FillSource,
}

/// Same-cycle redirect from predecode to the control-flow controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResteerRequest {
    /// The redirecting control-flow class.
    pub op: ControlFlowOp,
    /// Program counter of the redirecting instruction.
    pub src_pc: VirtAddr,
    /// Redirect target (ignored for returns, which consult the RAP).
    pub tgt_pc: VirtAddr,
    /// Translation bypass inherited from the parent transaction.
    pub passthru: bool,
    /// FTQ entry of the parent transaction.
    pub parent_ftq_idx: FtqIndex,
}

/// Architectural control-flow request from outside the front-end
/// (debug or a mid-core mispredict redirect).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchOverride {
    /// Program counter to continue the stream at.
    pub pc: VirtAddr,
    /// Treat the address as physical.
    pub passthru: bool,
}

/// TLB fill write from the external page-table walker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlbFill {
    /// Virtual page number being mapped.
    pub vpn: Vpn,
    /// Leaf page table entry.
    pub pte: Pte,
}

/// One cacheline-sized packet published to the decode interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchPacket {
    /// Originating FTQ entry.
    pub ftq_idx: FtqIndex,
    /// Cacheline-aligned address of the packet.
    pub vaddr: VirtAddr,
    /// Bitmap of valid words within the line.
    pub mask: u32,
    /// Instruction words.
    pub data: CacheLine,
}

/// A line-sized read request to the backing store (one port per MSHR).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRequest {
    /// Physical address of the requested line.
    pub addr: PhysAddr,
}
