//! In-memory connector for unit tests.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use crate::endpoint::Endpoint;
use crate::transport::{Connector, SessionOptions};

#[derive(Default)]
struct Script {
    replies: Vec<u8>,
    read_pos: usize,
    written: Vec<u8>,
    opens: usize,
    refuse: bool,
    fail_writes: bool,
    stall_reads: bool,
    stall_writes: bool,
}

/// Serves pre-scripted reply bytes and records everything written.
///
/// Clones share the same script, so a test keeps one handle while the
/// session owns the other.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one reply line; the delimiter is appended.
    pub fn reply(self, line: &str) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.replies.extend_from_slice(line.as_bytes());
            script.replies.push(b'\n');
        }
        self
    }

    /// Queues raw reply bytes as-is.
    pub fn reply_raw(self, bytes: &[u8]) -> Self {
        self.script
            .lock()
            .unwrap()
            .replies
            .extend_from_slice(bytes);
        self
    }

    /// Makes every `open` fail with `ConnectionRefused`.
    pub fn refusing(self) -> Self {
        self.script.lock().unwrap().refuse = true;
        self
    }

    /// Makes every write fail with `BrokenPipe`.
    pub fn failing_writes(self) -> Self {
        self.script.lock().unwrap().fail_writes = true;
        self
    }

    /// Makes reads past the scripted replies time out instead of hitting EOF.
    pub fn stalling(self) -> Self {
        self.script.lock().unwrap().stall_reads = true;
        self
    }

    /// Makes every write time out.
    pub fn stalling_writes(self) -> Self {
        self.script.lock().unwrap().stall_writes = true;
        self
    }

    /// Everything written so far, as text.
    pub fn written(&self) -> String {
        String::from_utf8(self.script.lock().unwrap().written.clone()).unwrap()
    }

    /// Number of streams opened.
    pub fn opens(&self) -> usize {
        self.script.lock().unwrap().opens
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    fn open(&self, _endpoint: &Endpoint, _options: &SessionOptions) -> io::Result<ScriptedStream> {
        let mut script = self.script.lock().unwrap();
        if script.refuse {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ));
        }
        script.opens += 1;
        Ok(ScriptedStream {
            script: Arc::clone(&self.script),
        })
    }
}

pub struct ScriptedStream {
    script: Arc<Mutex<Script>>,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = self.script.lock().unwrap();
        let start = script.read_pos;
        if start == script.replies.len() && script.stall_reads {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "Resource temporarily unavailable",
            ));
        }
        let n = (script.replies.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&script.replies[start..start + n]);
        script.read_pos += n;
        Ok(n)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut script = self.script.lock().unwrap();
        if script.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        if script.stall_writes {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        script.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
