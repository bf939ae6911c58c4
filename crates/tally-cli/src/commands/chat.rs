//! Assistant command implementations (ask, chat, history)

use std::future::pending;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use tally_core::{KeyValueStore, Presenter, RandomSource, Sender, Session, Submission, Ticket};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{sleep, Sleep};
use tracing::debug;

use super::{open_session, start_chat_session, start_session};

/// What a running timer delivers when it fires
#[derive(Debug, Clone, Copy)]
enum Timer {
    Reply(Ticket),
    FollowUp(Ticket),
}

type PendingTimer = Option<(Timer, Pin<Box<Sleep>>)>;

/// Resolve when the pending timer fires; never resolve without one
async fn timer_fired(timer: &mut PendingTimer) {
    match timer {
        Some((_, sleep)) => sleep.as_mut().await,
        None => pending::<()>().await,
    }
}

pub fn cmd_ask(data_dir: Option<&Path>, text: &str) -> Result<()> {
    let mut session = open_session(data_dir)?;
    start_session(&mut session);
    session.presenter_mut().quiet_user();

    println!();
    if session.ask(text).is_none() {
        println!("Nothing to ask. Try: tally ask \"budget tips\"");
    }
    println!();

    session.shutdown();
    Ok(())
}

pub async fn cmd_chat(data_dir: Option<&Path>) -> Result<()> {
    let mut session = open_session(data_dir)?;

    println!();
    println!("💬 Budget Assistant (type 'exit' to leave)");
    println!("   ─────────────────────────────────────────────────────────────");
    let welcome = start_chat_session(&mut session);

    let stats = run_chat(&mut session, welcome, BufReader::new(tokio::io::stdin())).await?;
    debug!(
        "Chat ended: {} sent, {} refused while busy, {} replies, {} follow-ups",
        stats.sent, stats.busy, stats.replies, stats.follow_ups
    );

    session.shutdown();
    println!("👋 Goodbye!");
    Ok(())
}

/// Counts from one [`run_chat`] conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatStats {
    pub sent: usize,
    pub busy: usize,
    pub replies: usize,
    pub follow_ups: usize,
}

/// Drive a started session from line-based input
///
/// Posts the welcome after `welcome` when given, then interleaves input
/// lines with reply and follow-up timers. Stops on `exit`/`quit`. When the
/// input ends, replies already scheduled are still delivered.
pub async fn run_chat<B, R, P, I>(
    session: &mut Session<B, R, P>,
    welcome: Option<Duration>,
    input: I,
) -> Result<ChatStats>
where
    B: KeyValueStore,
    R: RandomSource,
    P: Presenter,
    I: AsyncBufRead + Unpin,
{
    if let Some(delay) = welcome {
        sleep(delay).await;
        session.post_welcome();
    }

    let mut lines = input.lines();
    let mut open = true;
    let mut timer: PendingTimer = None;
    let mut stats = ChatStats::default();

    while open || timer.is_some() {
        tokio::select! {
            line = lines.next_line(), if open => {
                let Some(line) = line.context("Failed to read chat input")? else {
                    open = false;
                    continue;
                };
                let text = line.trim();
                if matches!(text, "exit" | "quit") {
                    break;
                }
                match session.send(text) {
                    // Replaces any pending follow-up timer; its ticket is stale now
                    Submission::Accepted { reply, .. } => {
                        stats.sent += 1;
                        timer = Some((Timer::Reply(reply.ticket), Box::pin(sleep(reply.delay))));
                    }
                    Submission::Busy => {
                        stats.busy += 1;
                        println!("   (still thinking, one moment)");
                    }
                    Submission::Ignored => {}
                }
            }
            _ = timer_fired(&mut timer) => {
                let Some((fired, _)) = timer.take() else {
                    continue;
                };
                match fired {
                    Timer::Reply(ticket) => {
                        let Some(reply) = session.deliver_response(ticket) else {
                            continue;
                        };
                        stats.replies += 1;
                        if let Some(next) = reply.follow_up {
                            timer = Some((Timer::FollowUp(next.ticket), Box::pin(sleep(next.delay))));
                        }
                    }
                    Timer::FollowUp(ticket) => {
                        if session.deliver_follow_up(ticket).is_some() {
                            stats.follow_ups += 1;
                        }
                    }
                }
            }
        }
    }

    Ok(stats)
}

pub fn cmd_history(data_dir: Option<&Path>, limit: usize) -> Result<()> {
    let mut session = open_session(data_dir)?;
    session.start();

    let transcript = session.transcript();
    if transcript.is_empty() {
        println!("No chat history yet. Try: tally ask \"budget tips\"");
        return Ok(());
    }

    let skip = transcript.len().saturating_sub(limit);
    println!();
    for message in &transcript[skip..] {
        let when = message.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        let who = match message.sender {
            Sender::User => "You",
            Sender::Bot => "Assistant",
        };
        println!("   [{}] {}: {}", when, who, message.text);
    }
    println!();
    Ok(())
}
