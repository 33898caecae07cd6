//! Operator console on stdin.
//!
//! One key per line: the press and release keys stand in for the serial
//! button when no port could be opened, and the reset key re-arms the
//! orientation calibration in any mode.

use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::BufRead;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEvent {
    Press,
    Release,
    ResetImu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleKeys {
    pub press: char,
    pub release: char,
    pub reset: char,
}

impl Default for ConsoleKeys {
    fn default() -> Self {
        Self {
            press: 'b',
            release: 'n',
            reset: 'r',
        }
    }
}

/// Map one console line to an event (case-insensitive, first character)
pub fn parse_console_line(line: &str, keys: &ConsoleKeys) -> Option<ConsoleEvent> {
    let key = line.trim().chars().next()?.to_ascii_lowercase();
    if key == keys.press.to_ascii_lowercase() {
        Some(ConsoleEvent::Press)
    } else if key == keys.release.to_ascii_lowercase() {
        Some(ConsoleEvent::Release)
    } else if key == keys.reset.to_ascii_lowercase() {
        Some(ConsoleEvent::ResetImu)
    } else {
        None
    }
}

/// Read lines until EOF or until the receiving side goes away
pub fn console_loop<R: BufRead>(reader: R, keys: ConsoleKeys, tx: Sender<ConsoleEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Console read error: {}", e);
                break;
            }
        };
        match parse_console_line(&line, &keys) {
            Some(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            None if !line.trim().is_empty() => {
                log::info!(
                    "Console keys: '{}' press, '{}' release, '{}' reset IMU",
                    keys.press,
                    keys.release,
                    keys.reset
                );
            }
            None => {}
        }
    }
    log::debug!("Console input closed");
}

/// Start the stdin console; the thread is detached (stdin reads cannot be interrupted)
pub fn spawn_console(keys: ConsoleKeys) -> Result<Receiver<ConsoleEvent>> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            console_loop(stdin.lock(), keys, tx);
        })
        .map_err(|e| Error::Other(format!("Failed to spawn console thread: {}", e)))?;
    Ok(rx)
}
