//! Fixture execution against the core API and the exported ABI.
//!
//! ABI calls go through raw pointers, so this is the one module of the harness
//! that needs `unsafe`. Before every such call the C contract is checked
//! against the fixture bytes: the pointer must be readable for `max_length`
//! bytes or up to the first NUL. Cases that would violate it are reported as
//! [`HarnessError::Precondition`] instead of being run.

use std::ffi::{c_char, c_int};
use std::str::FromStr;

use parking_lot::Mutex;
use serde::Deserialize;

use boundlen_abi::string_abi::{boundlen_strnlen, boundlen_strnlen_checked, str_len as abi_str_len};
use boundlen_core::{ScanError, TERMINATOR, errno, str_len, str_len_clamped};
use boundlen_membrane::config::{SafetyLevel, pin_safety_level, restore_pinned_level};
use boundlen_membrane::heal::{HealingSnapshot, global_healing_policy};

use crate::error::HarnessError;

// Mode pinning and healing snapshots are process-wide; one ABI case at a time.
static EXEC_LOCK: Mutex<()> = Mutex::new(());

/// Functions a fixture case can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFunction {
    /// Checked core scan.
    StrLen,
    /// Clamped core scan.
    StrLenClamped,
    /// Exported `int str_len(const char *, size_t)`.
    StrLenAbi,
    /// Exported `boundlen_strnlen`.
    Strnlen,
    /// Exported `boundlen_strnlen_checked`, buffer capacity = fixture byte count.
    StrnlenChecked,
}

impl ScanFunction {
    pub const ALL: [Self; 5] = [
        Self::StrLen,
        Self::StrLenClamped,
        Self::StrLenAbi,
        Self::Strnlen,
        Self::StrnlenChecked,
    ];

    /// Fixture/CLI name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StrLen => "str_len",
            Self::StrLenClamped => "str_len_clamped",
            Self::StrLenAbi => "str_len_abi",
            Self::Strnlen => "boundlen_strnlen",
            Self::StrnlenChecked => "boundlen_strnlen_checked",
        }
    }

    /// True for functions that cross the C ABI (and therefore the membrane).
    #[must_use]
    pub const fn is_abi(self) -> bool {
        !matches!(self, Self::StrLen | Self::StrLenClamped)
    }
}

impl FromStr for ScanFunction {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| HarnessError::UnknownFunction(s.to_string()))
    }
}

/// Decoded fixture inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanInputs {
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
    #[serde(default)]
    pub text: Option<String>,
    /// Pass a null pointer to ABI functions.
    #[serde(default)]
    pub null: bool,
    pub max_length: usize,
}

impl ScanInputs {
    /// Decode from a fixture `inputs` value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, HarnessError> {
        let inputs: Self = serde_json::from_value(value.clone())
            .map_err(|e| HarnessError::InvalidInputs(e.to_string()))?;
        match (&inputs.bytes, &inputs.text) {
            (Some(_), Some(_)) => Err(HarnessError::InvalidInputs(
                "give either `bytes` or `text`, not both".to_string(),
            )),
            (None, None) if !inputs.null => Err(HarnessError::InvalidInputs(
                "missing `bytes` or `text`".to_string(),
            )),
            _ => Ok(inputs),
        }
    }

    /// Buffer contents.
    #[must_use]
    pub fn buffer(&self) -> Vec<u8> {
        match (&self.bytes, &self.text) {
            (Some(bytes), _) => bytes.clone(),
            (None, Some(text)) => text.as_bytes().to_vec(),
            (None, None) => Vec::new(),
        }
    }
}

/// Outcome of running one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseExecution {
    /// Output of our implementation.
    pub impl_output: String,
    /// Host `strnlen` output, when the function has a host counterpart.
    pub host_output: Option<String>,
    /// Whether our output matches the host (true when there is no host output).
    pub host_parity: bool,
    /// Healing recorded by the membrane during the call.
    pub healing_action: Option<String>,
}

/// Run a fixture case: `function` name and raw `inputs`, under `level`.
pub fn execute_fixture_case(
    function: &str,
    inputs: &serde_json::Value,
    level: SafetyLevel,
) -> Result<CaseExecution, HarnessError> {
    let function = ScanFunction::from_str(function)?;
    let inputs = ScanInputs::from_value(inputs)?;
    execute_scan(function, &inputs, level)
}

/// Run `function` over decoded inputs under `level`.
pub fn execute_scan(
    function: ScanFunction,
    inputs: &ScanInputs,
    level: SafetyLevel,
) -> Result<CaseExecution, HarnessError> {
    if !function.is_abi() {
        return execute_core(function, inputs);
    }

    let buf = inputs.buffer();
    let max_length = inputs.max_length;
    let ptr: *const c_char = if inputs.null {
        std::ptr::null()
    } else {
        buf.as_ptr().cast()
    };
    let readable =
        inputs.null || function == ScanFunction::StrnlenChecked || abi_readable(&buf, max_length);
    if !readable {
        return Err(HarnessError::Precondition {
            max_length,
            available: buf.len(),
        });
    }

    let _guard = EXEC_LOCK.lock();
    let previous = pin_safety_level(level);
    let before = global_healing_policy().snapshot();
    let impl_output = match function {
        // SAFETY: readability checked above (or pointer is null, which the ABI handles).
        ScanFunction::StrLenAbi => unsafe { abi_str_len(ptr, max_length) }.to_string(),
        // SAFETY: as above.
        ScanFunction::Strnlen => unsafe { boundlen_strnlen(ptr, max_length) }.to_string(),
        _ => {
            let buf_len = if inputs.null { 0 } else { buf.len() };
            let mut out = 0usize;
            // SAFETY: `ptr` is readable for `buf_len` bytes; `out` is a live local.
            let rc = unsafe { boundlen_strnlen_checked(ptr, buf_len, max_length, &mut out) };
            if rc == 0 {
                out.to_string()
            } else {
                format!("error:{}", errno_name(rc))
            }
        }
    };
    let healing_action = healing_delta(before, global_healing_policy().snapshot());
    restore_pinned_level(previous);

    let host_output = match function {
        ScanFunction::StrLenAbi | ScanFunction::Strnlen if !inputs.null => {
            // SAFETY: same readability contract as the call above.
            Some(unsafe { libc::strnlen(ptr, max_length) }.to_string())
        }
        _ => None,
    };
    let host_parity = host_output.as_ref().is_none_or(|h| *h == impl_output);

    Ok(CaseExecution {
        impl_output,
        host_output,
        host_parity,
        healing_action,
    })
}

fn execute_core(
    function: ScanFunction,
    inputs: &ScanInputs,
) -> Result<CaseExecution, HarnessError> {
    if inputs.null {
        return Err(HarnessError::InvalidInputs(
            "`null` only applies to ABI functions".to_string(),
        ));
    }
    let buf = inputs.buffer();
    let impl_output = if function == ScanFunction::StrLenClamped {
        str_len_clamped(&buf, inputs.max_length).to_string()
    } else {
        render_result(str_len(&buf, inputs.max_length))
    };
    Ok(CaseExecution {
        impl_output,
        host_output: None,
        host_parity: true,
        healing_action: None,
    })
}

/// C contract for pointer scans: readable for `max_length` bytes, or up to the
/// first NUL if that comes earlier.
fn abi_readable(buf: &[u8], max_length: usize) -> bool {
    max_length <= buf.len() || buf.contains(&TERMINATOR)
}

fn render_result(result: Result<usize, ScanError>) -> String {
    match result {
        Ok(n) => n.to_string(),
        Err(err) => format!("error:{}", errno_name(err.errno())),
    }
}

fn errno_name(code: c_int) -> String {
    if code == errno::EINVAL {
        "EINVAL".to_string()
    } else {
        format!("errno{code}")
    }
}

fn healing_delta(before: HealingSnapshot, after: HealingSnapshot) -> Option<String> {
    if after.size_clamps > before.size_clamps {
        Some("ClampSize".to_string())
    } else if after.safe_defaults > before.safe_defaults {
        Some("ReturnSafeDefault".to_string())
    } else {
        None
    }
}
