use std::io::{BufRead, Write};
use std::time::Duration;

use crossbeam_channel::{after, bounded, select, tick};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected,
}

/// The confirmation dialog seam. Implementations own the timeout policy;
/// the applier only sees the final decision.
pub trait Confirm {
    fn confirm(&self) -> Decision;
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&self) -> Decision { (**self).confirm() }
}

/// Accepts every layout without asking. Backs `--yes` and the
/// `confirm.auto_accept` setting.
pub struct AutoAccept;

impl Confirm for AutoAccept {
    fn confirm(&self) -> Decision { Decision::Accepted }
}

/// Terminal countdown prompt. An unanswered prompt counts as a rejection so
/// a layout that left the displays unreadable reverts on its own.
pub struct CountdownPrompt {
    timeout: Duration,
}

impl CountdownPrompt {
    pub fn new(timeout: Duration) -> Self { Self { timeout } }

    fn redraw(&self, remaining: u64) {
        eprint!("\rKeep this layout? [Y/n] (reverting in {remaining}s) ");
        let _ = std::io::stderr().flush();
    }
}

impl Confirm for CountdownPrompt {
    fn confirm(&self) -> Decision {
        let (answer_tx, answer_rx) = bounded(1);
        // The reader stays parked on stdin if the countdown wins; the process
        // is about to exit, so it is never joined.
        std::thread::spawn(move || {
            let mut line = String::new();
            let accepted = match std::io::stdin().lock().read_line(&mut line) {
                Ok(_) => matches!(line.trim(), "" | "y" | "Y" | "yes"),
                Err(_) => false,
            };
            let _ = answer_tx.send(accepted);
        });

        let mut remaining = self.timeout.as_secs();
        self.redraw(remaining);
        let deadline = after(self.timeout);
        let ticker = tick(Duration::from_secs(1));
        loop {
            select! {
                recv(answer_rx) -> answer => {
                    eprintln!();
                    return if answer.unwrap_or(false) {
                        Decision::Accepted
                    } else {
                        Decision::Rejected
                    };
                }
                recv(ticker) -> _ => {
                    remaining = remaining.saturating_sub(1);
                    self.redraw(remaining);
                }
                recv(deadline) -> _ => {
                    eprintln!();
                    debug!("confirmation timed out");
                    return Decision::Rejected;
                }
            }
        }
    }
}
