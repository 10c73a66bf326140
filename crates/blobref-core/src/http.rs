//! HTTP(S) backend.
//!
//! Uses the curl crate (libcurl) for plain unauthenticated GETs. `get` reads
//! the whole body; `open` hands the body out as a `Read` while the transfer
//! is still running on a worker thread.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use std::cell::Cell;
use std::fmt;
use std::io::{self, Read};
use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Performs a GET and returns the whole response body.
///
/// Transport errors are returned unchanged. Non-2xx statuses only fail when
/// `cfg.reject_error_status` is set.
pub fn get(url: &str, cfg: &HttpConfig) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut easy = new_easy(url, cfg)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    let code = easy.response_code()?;
    check_status(url, code, cfg)?;
    tracing::debug!("GET {} -> HTTP {} ({} bytes)", url, code, body.len());
    Ok(body)
}

/// Starts a GET and returns its body as a stream.
///
/// Blocks until the response starts (or the transfer fails), so connection
/// errors surface here rather than on the first read.
pub fn open(url: &str, cfg: &HttpConfig) -> Result<HttpBody> {
    let (tx, rx) = mpsc::sync_channel(cfg.stream_buffer_chunks.max(1));
    let cancel = Arc::new(AtomicBool::new(false));
    let worker = {
        let url = url.to_string();
        let cfg = cfg.clone();
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            let result = transfer_into(&url, &cfg, &tx, &cancel);
            // Receiver may already be gone; nothing left to report to.
            let _ = tx.send(Message::Done(result));
        })
    };

    let mut body = HttpBody {
        url: url.to_string(),
        rx: Some(rx),
        worker: Some(worker),
        cancel,
        chunk: Vec::new(),
        pos: 0,
        done: false,
    };
    let code = body.wait_for_response()?;
    check_status(url, code, cfg)?;
    tracing::debug!("GET {} -> HTTP {} (streaming)", url, code);
    Ok(body)
}

enum Message {
    /// First body bytes are about to follow; carries the final status code.
    Start(u32),
    Chunk(Vec<u8>),
    Done(std::result::Result<u32, curl::Error>),
}

fn new_easy(url: &str, cfg: &HttpConfig) -> std::result::Result<curl::easy::Easy, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(cfg.follow_redirects)?;
    if cfg.follow_redirects {
        easy.max_redirections(cfg.max_redirections)?;
    }
    Ok(easy)
}

fn check_status(url: &str, code: u32, cfg: &HttpConfig) -> Result<()> {
    if (200..300).contains(&code) {
        return Ok(());
    }
    if cfg.reject_error_status {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            code,
        });
    }
    tracing::warn!("GET {} returned HTTP {}; using response body as content", url, code);
    Ok(())
}

/// Status code from a status line such as `HTTP/1.1 404 Not Found`.
fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

fn transfer_into(
    url: &str,
    cfg: &HttpConfig,
    tx: &SyncSender<Message>,
    cancel: &AtomicBool,
) -> std::result::Result<u32, curl::Error> {
    let mut easy = new_easy(url, cfg)?;
    // Progress callbacks fire even while idle, which lets a dropped reader
    // abort a stalled transfer.
    easy.progress(true)?;
    let status = Cell::new(0u32);
    let started = Cell::new(false);
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                status.set(code);
            }
            true
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.load(Ordering::Relaxed))?;
        transfer.write_function(|data| {
            if !started.get() {
                started.set(true);
                if tx.send(Message::Start(status.get())).is_err() {
                    return Ok(0);
                }
            }
            match tx.send(Message::Chunk(data.to_vec())) {
                Ok(()) => Ok(data.len()),
                Err(_) => Ok(0), // reader dropped; abort transfer
            }
        })?;
        transfer.perform()?;
    }
    easy.response_code()
}

/// Response body of a streaming GET.
///
/// Dropping it aborts the transfer if still running and waits for the
/// worker thread, so the connection is released on every exit path.
pub struct HttpBody {
    url: String,
    rx: Option<Receiver<Message>>,
    worker: Option<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
    chunk: Vec<u8>,
    pos: usize,
    done: bool,
}

impl HttpBody {
    pub fn url(&self) -> &str {
        &self.url
    }

    fn recv(&self) -> Option<Message> {
        self.rx.as_ref()?.recv().ok()
    }

    fn wait_for_response(&mut self) -> Result<u32> {
        match self.recv() {
            Some(Message::Start(code)) => Ok(code),
            Some(Message::Done(Ok(code))) => {
                self.done = true;
                Ok(code)
            }
            Some(Message::Done(Err(e))) => {
                self.done = true;
                Err(Error::Http(e))
            }
            Some(Message::Chunk(_)) | None => Err(Error::Worker {
                url: self.url.clone(),
            }),
        }
    }
}

impl Read for HttpBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let remaining = &self.chunk[self.pos..];
            if !remaining.is_empty() {
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                self.pos += n;
                return Ok(n);
            }
            if self.done || buf.is_empty() {
                return Ok(0);
            }
            match self.recv() {
                Some(Message::Chunk(data)) => {
                    self.chunk = data;
                    self.pos = 0;
                }
                Some(Message::Start(_)) => {}
                Some(Message::Done(Ok(_))) => self.done = true,
                Some(Message::Done(Err(e))) => {
                    self.done = true;
                    return Err(io::Error::other(e));
                }
                None => {
                    self.done = true;
                    return Err(io::Error::other(Error::Worker {
                        url: self.url.clone(),
                    }));
                }
            }
        }
    }
}

impl Drop for HttpBody {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        // Closing the receiver fails any pending send, which aborts the transfer.
        self.rx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("transfer worker for {} panicked", self.url);
            }
        }
    }
}

impl fmt::Debug for HttpBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBody")
            .field("url", &self.url)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
