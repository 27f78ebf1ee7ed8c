use std::sync::Mutex;
use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use locus::CollectProgress;

/// Progress state behind a single lock.
#[derive(Default)]
struct ProgressState {
    /// Spinner counting collected users during the search.
    users_bar: Option<ProgressBar>,
    /// Bar over the users whose repositories are being listed.
    repos_bar: Option<ProgressBar>,
    /// Repositories listed so far, across users.
    repos_total: usize,
    /// Users left out after a failed profile lookup.
    skipped: usize,
}

/// Interactive progress reporter using indicatif.
///
/// Shows one spinner for the user search and one bar for the per-user
/// repository listings. Warnings and written tables are printed above the
/// bars.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: CollectProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            CollectProgress::SearchingUsers { query } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::counter_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_prefix(format!("{:12}", "users"));
                pb.set_message(format!("searching {query}"));
                state.users_bar = Some(pb);
            }

            CollectProgress::FetchedUserPage { page, .. } => {
                if let Some(ref pb) = state.users_bar {
                    pb.set_message(format!("page {page} done"));
                }
            }

            CollectProgress::UserCollected { .. } => {
                if let Some(ref pb) = state.users_bar {
                    pb.inc(1);
                }
            }

            CollectProgress::UserSkipped { login, reason } => {
                state.skipped += 1;
                self.warn(&format!("skipped {login}: {reason}"));
            }

            CollectProgress::UsersComplete { total } => {
                if let Some(ref pb) = state.users_bar {
                    let msg = if state.skipped > 0 {
                        format!("users collected, {} skipped", state.skipped)
                    } else {
                        "users collected".to_string()
                    };
                    pb.set_position(total as u64);
                    pb.finish_with_message(msg);
                }
            }

            CollectProgress::FetchingRepos { login, index, of } => {
                let pb = state.repos_bar.get_or_insert_with(|| {
                    let bar = self.multi.add(ProgressBar::new(of as u64));
                    bar.set_style(Self::bar_style());
                    bar.set_prefix(format!("{:12}", "repositories"));
                    bar
                });
                pb.set_position(index.saturating_sub(1) as u64);
                pb.set_message(login);
            }

            CollectProgress::ReposComplete { total, .. } => {
                state.repos_total += total;
                let repos_total = state.repos_total;
                if let Some(ref pb) = state.repos_bar {
                    pb.inc(1);
                    pb.set_message(format!("{repos_total} repositories"));
                    if pb.length().is_some_and(|len| pb.position() >= len) {
                        pb.finish();
                    }
                }
            }

            CollectProgress::TableWritten { path, rows } => {
                self.multi
                    .println(format!(
                        "{} {} ({} rows)",
                        style("Saved").green().bold(),
                        path.display(),
                        rows
                    ))
                    .ok();
            }

            CollectProgress::Warning { message } => {
                self.warn(&message);
            }

            _ => {}
        }
    }

    fn warn(&self, message: &str) {
        self.multi
            .println(format!("{} {}", style("warning:").yellow().bold(), message))
            .ok();
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.users_bar, &state.repos_bar].into_iter().flatten() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {pos:>4} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
