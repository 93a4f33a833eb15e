use crate::interrupts::frame::InterruptFrame;
use log::{Level, Log, Metadata, Record};

/// Mnemonic names of the architectural exceptions; `None` marks reserved
/// vectors.
const FAULT_NAMES: [Option<&str>; 32] = [
    Some("Divide Error"),
    Some("Debug"),
    Some("Non-Maskable Interrupt"),
    Some("Breakpoint"),
    Some("Overflow"),
    Some("Bound Range Exceeded"),
    Some("Invalid Opcode"),
    Some("Device Not Available"),
    Some("Double Fault"),
    None,
    Some("Invalid TSS"),
    Some("Segment Not Present"),
    Some("Stack-Segment Fault"),
    Some("General Protection"),
    Some("Page Fault"),
    None,
    Some("x87 Floating-Point Error"),
    Some("Alignment Check"),
    Some("Machine Check"),
    Some("SIMD Floating-Point Exception"),
    Some("Virtualization Exception"),
    Some("Control Protection Exception"),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// The name of exception `vector`, if it has one.
#[must_use]
pub fn fault_name(vector: u64) -> Option<&'static str> {
    usize::try_from(vector)
        .ok()
        .and_then(|v| FAULT_NAMES.get(v).copied().flatten())
}

/// What the dispatcher reports for one exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultReport {
    pub level: Level,
    pub name: &'static str,
    pub vector: u64,
    pub error_code: u64,
    pub rip: u64,
}

/// Classify `frame`.
///
/// Named vectors with a zero error code are reported at debug level, those
/// with a nonzero error code at error level. Reserved vectors and anything
/// at or above 32 produce no report.
#[must_use]
pub fn describe(frame: &InterruptFrame) -> Option<FaultReport> {
    let name = fault_name(frame.vector)?;
    let level = if frame.error_code == 0 {
        Level::Debug
    } else {
        Level::Error
    };
    Some(FaultReport {
        level,
        name,
        vector: frame.vector,
        error_code: frame.error_code,
        rip: frame.rip,
    })
}

/// Report `frame` through `logger` as at most one line.
pub fn dispatch(frame: &InterruptFrame, logger: &dyn Log) {
    let Some(report) = describe(frame) else {
        return;
    };

    let metadata = Metadata::builder()
        .level(report.level)
        .target(module_path!())
        .build();
    if !logger.enabled(&metadata) {
        return;
    }

    logger.log(
        &Record::builder()
            .metadata(metadata)
            .args(format_args!(
                "Exception: {} (vector {}, error code {:#x}) at {:#018x}",
                report.name, report.vector, report.error_code, report.rip
            ))
            .build(),
    );
}

/// Called by the common trampoline with `rdi` pointing at the saved frame.
pub(crate) extern "C" fn dispatch_exception(frame: &InterruptFrame) {
    dispatch(frame, log::logger());
}
