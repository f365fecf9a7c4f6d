//! Resource limits applied to every sandboxed process.
//!
//! The wall-clock timeout lives on the request; these limits bound what the
//! process may consume while it runs. They are applied with `setrlimit`
//! between `fork` and `exec`, so the ceiling is in place before the first
//! instruction of untrusted code.

use serde::{Deserialize, Serialize};

/// Resource ceilings for one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum address-space size in bytes (RLIMIT_AS)
    pub max_memory_bytes: Option<u64>,

    /// Maximum CPU seconds (RLIMIT_CPU); a backstop under the wall-clock
    /// timeout for snippets that burn CPU without blocking
    pub max_cpu_seconds: Option<u64>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_memory_bytes: Some(512 * 1024 * 1024), // 512 MiB
            max_cpu_seconds: None,
        }
    }
}

impl ResourceLimits {
    /// No ceilings at all. Only sensible for trusted maintenance snippets.
    pub fn unlimited() -> Self {
        Self {
            max_memory_bytes: None,
            max_cpu_seconds: None,
        }
    }

    /// Tight ceilings for short, untrusted snippets.
    pub fn strict() -> Self {
        Self {
            max_memory_bytes: Some(128 * 1024 * 1024), // 128 MiB
            max_cpu_seconds: Some(10),
        }
    }

    /// Room for large dataframes.
    pub fn permissive() -> Self {
        Self {
            max_memory_bytes: Some(2 * 1024 * 1024 * 1024), // 2 GiB
            max_cpu_seconds: None,
        }
    }

    /// Apply the limits to the calling process.
    ///
    /// Runs in the forked child before `exec`, so it must stay
    /// async-signal-safe: raw `setrlimit` calls only, no allocation.
    #[cfg(unix)]
    pub(crate) fn apply_to_current_process(&self) -> std::io::Result<()> {
        if let Some(bytes) = self.max_memory_bytes {
            let limit = libc::rlimit {
                rlim_cur: bytes as libc::rlim_t,
                rlim_max: bytes as libc::rlim_t,
            };
            // SAFETY: limit is a valid rlimit value for RLIMIT_AS.
            if unsafe { libc::setrlimit(libc::RLIMIT_AS, &limit) } == -1 {
                return Err(std::io::Error::last_os_error());
            }
        }
        if let Some(seconds) = self.max_cpu_seconds {
            let limit = libc::rlimit {
                rlim_cur: seconds as libc::rlim_t,
                rlim_max: seconds as libc::rlim_t,
            };
            // SAFETY: limit is a valid rlimit value for RLIMIT_CPU.
            if unsafe { libc::setrlimit(libc::RLIMIT_CPU, &limit) } == -1 {
                return Err(std::io::Error::last_os_error());
            }
        }
        Ok(())
    }
}
