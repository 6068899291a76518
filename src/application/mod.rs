//! Application layer - the use cases behind each CLI command

pub mod info;
pub mod read;

pub use info::{
    InfoRequest, InfoSections, InfoUseCase, OperationSummary, all_operations, get_operations,
    render_info,
};
pub use read::{ReadRequest, ReadUseCase};
