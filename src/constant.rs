// Area ID
#[derive(Clone, Copy)]
#[allow(dead_code)]
pub enum Area {
    ProcessInput = 0x81,
    ProcessOutput = 0x82,
    Merker = 0x83,
    DataBausteine = 0x84, //German thing, means building blocks
    Counter = 0x1C,
    Timer = 0x1D,
    Unknown,
}

// Word Length
pub const WL_BIT: i32 = 0x01; //Bit (inside a word)
pub const WL_BYTE: i32 = 0x02; //Byte (8 bit)
pub const WL_CHAR: i32 = 0x03;
pub const WL_WORD: i32 = 0x04; //Word (16 bit)
pub const WL_INT: i32 = 0x05;
pub const WL_DWORD: i32 = 0x06; //Double Word (32 bit)
pub const WL_DINT: i32 = 0x07;
pub const WL_REAL: i32 = 0x08; //Real (32 bit float)
pub const WL_COUNTER: i32 = 0x1C; //Counter (16 bit)
pub const WL_TIMER: i32 = 0x1D; //Timer (16 bit)

//dataSize to number of byte accordingly
pub fn data_size_byte(word_length: i32) -> i32 {
    match word_length {
        WL_BIT | WL_BYTE | WL_CHAR => 1,
        WL_WORD | WL_INT | WL_COUNTER | WL_TIMER => 2,
        WL_DWORD | WL_DINT | WL_REAL => 4,
        _ => 0,
    }
}

// PLC Status
pub const CPU_STATUS_UNKNOWN: i32 = 0;
pub const CPU_STATUS_RUN: i32 = 8;
pub const CPU_STATUS_STOP: i32 = 4;

/// CPU status as reported by `PLCGetStatus`'s response byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CpuStatus {
    Unknown,
    Run,
    Stop,
}

impl CpuStatus {
    /// Maps the raw status byte, coercing anything outside `{0, 4, 8}` to
    /// `Stop` since older CPUs are known to report other values (e.g. `3`)
    /// while actually stopped.
    pub fn from_u8(status: u8) -> CpuStatus {
        match status as i32 {
            CPU_STATUS_UNKNOWN => CpuStatus::Unknown,
            CPU_STATUS_RUN => CpuStatus::Run,
            CPU_STATUS_STOP => CpuStatus::Stop,
            _ => CpuStatus::Stop,
        }
    }
}

/// Block type byte used in the block-list/block-info telegrams.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubBlockType {
    OB = 0x38,
    DB = 0x41,
    SDB = 0x42,
    FC = 0x43,
    SFC = 0x44,
    FB = 0x45,
    SFB = 0x46,
}

impl SubBlockType {
    pub fn from_u8(b: u8) -> Option<SubBlockType> {
        match b {
            0x38 => Some(SubBlockType::OB),
            0x41 => Some(SubBlockType::DB),
            0x42 => Some(SubBlockType::SDB),
            0x43 => Some(SubBlockType::FC),
            0x44 => Some(SubBlockType::SFC),
            0x45 => Some(SubBlockType::FB),
            0x46 => Some(SubBlockType::SFB),
            _ => None,
        }
    }
}

/// Source language a block was compiled from, reported by block info.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlockLang {
    Awl = 0x01,
    Kop = 0x02,
    Fup = 0x03,
    Scl = 0x04,
    Db = 0x05,
    Graph = 0x06,
    Unknown,
}

impl BlockLang {
    pub fn from_u8(b: u8) -> BlockLang {
        match b {
            0x01 => BlockLang::Awl,
            0x02 => BlockLang::Kop,
            0x03 => BlockLang::Fup,
            0x04 => BlockLang::Scl,
            0x05 => BlockLang::Db,
            0x06 => BlockLang::Graph,
            _ => BlockLang::Unknown,
        }
    }
}

//size header
pub const SIZE_HEADER_READ: i32 = 31; // Header Size when Reading
pub const SIZE_HEADER_WRITE: i32 = 35; // Header Size when Writing

// Result transport size
pub const TS_RES_BIT: i32 = 3;
pub const TS_RES_BYTE: i32 = 4;
pub const TS_RES_INT: i32 = 5;
pub const TS_RES_REAL: i32 = 7;
pub const TS_RES_OCTET: i32 = 9;

/// Maximum number of items packed into a single multi-read or multi-write telegram.
pub const MAX_VARS_MULTI: usize = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_status_from_u8() {
        assert_eq!(CpuStatus::from_u8(8), CpuStatus::Run);
        assert_eq!(CpuStatus::from_u8(4), CpuStatus::Stop);
        assert_eq!(CpuStatus::from_u8(0), CpuStatus::Unknown);
        // older CPUs report other values (e.g. 3) while stopped
        assert_eq!(CpuStatus::from_u8(3), CpuStatus::Stop);
    }

    #[test]
    fn sub_block_type_from_u8() {
        assert_eq!(SubBlockType::from_u8(0x41), Some(SubBlockType::DB));
        assert_eq!(SubBlockType::from_u8(0xFF), None);
    }
}
