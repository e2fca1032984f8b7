//! Magic values identifying the builtin image formats.
//!
//! Each container file begins with one of these 32-bit tags. The values
//! follow the checkpoint tool's convention of packing short ASCII-ish
//! mnemonics into a word; what matters is that they are unique and
//! stable on disk.

/// Inventory file: one `InventoryEntry`
pub const INVENTORY: u32 = 0x5831_3116;

/// Kernel object ids: one `TaskKobjIdsEntry`
pub const IDS: u32 = 0x5443_2030;

/// UTS namespace: one `UtsnsEntry`
pub const UTSNS: u32 = 0x5445_5326;

/// Ghost (deleted-but-open) file metadata: one `GhostFileEntry`
pub const GHOST_FILE: u32 = 0x5258_3605;

/// Process tree: array of `PstreeEntry`
pub const PSTREE: u32 = 0x5027_3030;

/// Regular files: array of `RegFileEntry`
pub const REG_FILES: u32 = 0x5026_3146;

/// File descriptor table: array of `FdinfoEntry`
pub const FDINFO: u32 = 0x5621_3732;

/// Pipe contents: array of `PipeDataEntry`
pub const PIPES_DATA: u32 = 0x5615_5525;

/// Page map: a `PagemapHead` header followed by `PagemapEntry` records
pub const PAGEMAP: u32 = 0x5608_4025;
