//! Where outgoing messages go.

use std::io::{self, Write};

use colored::Colorize;
#[cfg(test)]
use parking_lot::Mutex;

use notte_core::Message;

use crate::error::BotResult;

/// Delivers messages to users.
pub trait NotificationSink: Send + Sync {
    /// Deliver one message.
    fn send(&self, message: &Message) -> BotResult<()>;
}

/// Prints messages to stdout, one block per message.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn send(&self, message: &Message) -> BotResult<()> {
        let mut out = io::stdout().lock();
        if let Some(content) = &message.content {
            writeln!(out, "{content}")?;
        }
        for embed in &message.embeds {
            let text = embed.to_string();
            let mut lines = text.lines();
            if let Some(first) = lines.next() {
                writeln!(out, "{}", first.bold())?;
            }
            for line in lines {
                writeln!(out, "  {line}")?;
            }
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// Collects messages in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub sent: Mutex<Vec<Message>>,
}

#[cfg(test)]
impl NotificationSink for MemorySink {
    fn send(&self, message: &Message) -> BotResult<()> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
