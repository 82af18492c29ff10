//! `--dry-run` sink: prints chunks instead of posting them.

use std::io::Write;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use appscout_telegram::{ChatSink, ParseMode};

pub struct ConsoleSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

#[async_trait]
impl<W: Write + Send> ChatSink for ConsoleSink<W> {
    async fn send_chunk(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("console output lock poisoned"))?;
        let mode = parse_mode.map_or_else(|| "plain".to_string(), |mode| format!("{mode:?}"));
        writeln!(out, "----- chunk ({mode}, {} chars) -----", text.chars().count())?;
        writeln!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }
}
