//! Operator-facing output for audits and convergence waits.
//!
//! The audit loop reports through these traits instead of printing
//! directly, so the library is usable without a terminal and tests can
//! capture exactly what an operator would have seen. [`ConsoleReporter`]
//! reproduces the tool's line-oriented output: a single in-place progress
//! line, one line per violation as it is found, and a final summary.

use std::io::Write;

use rackwatch_types::BlockId;

use crate::waiter::ConvergenceOutcome;

/// Sink for audit progress and findings.
pub trait AuditReporter: Send {
    /// Show the path currently being examined.
    ///
    /// `last_len` is the printed length of the previous progress line,
    /// threaded through by the caller; the return value is this line's
    /// length, passed back on the next call so stale characters can be
    /// blanked out.
    fn progress(&mut self, path: &str, last_len: usize) -> usize;

    /// A file was skipped because it is open for writing.
    fn open_file(&mut self, path: &str);

    /// A file was skipped because one of its blocks is corrupt.
    fn corrupt_file(&mut self, block: BlockId, path: &str);

    /// A block has no live replicas at all. Reported separately from
    /// policy violations.
    fn lost_block(&mut self, block: BlockId, path: &str);

    /// A block violates the placement policy by `missing_racks` racks.
    fn violation(&mut self, block: BlockId, path: &str, missing_racks: u32);

    /// The audit finished; `violating` files failed the policy.
    fn summary(&mut self, violating: usize);
}

/// Sink for convergence-wait progress.
pub trait WaitReporter: Send {
    /// A path did not converge on its first poll; the wait begins.
    fn wait_started(&mut self, path: &str);

    /// One more poll cycle completed without convergence.
    fn wait_tick(&mut self);

    /// The target is below the current replica count somewhere; the
    /// wait may be long. Emitted at most once per path.
    fn decrease_warning(&mut self);

    /// A path reached a terminal outcome.
    fn wait_finished(&mut self, path: &str, outcome: &ConvergenceOutcome);
}

/// Line-oriented console output matching the original operator tool.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    fn flush() {
        let _ = std::io::stdout().flush();
    }
}

impl AuditReporter for ConsoleReporter {
    fn progress(&mut self, path: &str, last_len: usize) -> usize {
        // Pad with spaces to overwrite the tail of a longer previous path.
        let padding = last_len.saturating_sub(path.len());
        print!("{path}{:padding$}\r", "");
        Self::flush();
        path.len()
    }

    fn open_file(&mut self, path: &str) {
        println!("\nNot checking open file : {path}");
    }

    fn corrupt_file(&mut self, block: BlockId, path: &str) {
        println!("\n{block} is corrupt so skipping file : {path}");
    }

    fn lost_block(&mut self, block: BlockId, path: &str) {
        println!("\n{block} of file {path} has no live replicas.");
    }

    fn violation(&mut self, block: BlockId, path: &str, missing_racks: u32) {
        println!(
            "\nReplica placement policy is violated for {block} of file {path}. \
             Block should be additionally replicated on {missing_racks} more rack(s)."
        );
    }

    fn summary(&mut self, violating: usize) {
        println!("Got {violating} files. Done.");
    }
}

impl WaitReporter for ConsoleReporter {
    fn wait_started(&mut self, path: &str) {
        print!("Waiting for {path} ...");
        Self::flush();
    }

    fn wait_tick(&mut self) {
        print!(".");
        Self::flush();
    }

    fn decrease_warning(&mut self) {
        println!("\nWARNING: the waiting time may be long for DECREASING the number of replication.");
    }

    fn wait_finished(&mut self, path: &str, outcome: &ConvergenceOutcome) {
        match outcome {
            ConvergenceOutcome::Satisfied => println!(" done"),
            ConvergenceOutcome::TimedOut => println!(" gave up waiting for {path}"),
            ConvergenceOutcome::Cancelled => println!(" cancelled"),
            ConvergenceOutcome::Gone => println!(" {path} no longer exists"),
        }
    }
}

/// Reporter that swallows everything. For library callers and tests
/// that only care about the returned report.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl AuditReporter for SilentReporter {
    fn progress(&mut self, path: &str, _last_len: usize) -> usize {
        path.len()
    }
    fn open_file(&mut self, _path: &str) {}
    fn corrupt_file(&mut self, _block: BlockId, _path: &str) {}
    fn lost_block(&mut self, _block: BlockId, _path: &str) {}
    fn violation(&mut self, _block: BlockId, _path: &str, _missing_racks: u32) {}
    fn summary(&mut self, _violating: usize) {}
}

impl WaitReporter for SilentReporter {
    fn wait_started(&mut self, _path: &str) {}
    fn wait_tick(&mut self) {}
    fn decrease_warning(&mut self) {}
    fn wait_finished(&mut self, _path: &str, _outcome: &ConvergenceOutcome) {}
}
