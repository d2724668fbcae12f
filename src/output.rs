use indicatif::{ProgressDrawTarget, TermLike};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for human-readable text: previews, reports, prompts and progress.
///
/// Cloning an `Output` yields another handle to the same stream.
#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    Buffer(SharedBuffer),
    Writer(SharedWriter),
}

impl Output {
    /// An in-memory output, returned together with a handle to read it back.
    pub fn buffer() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Output::Buffer(buffer.clone()), buffer)
    }

    /// An output forwarding to any writer, e.g. a log file.
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Output::Writer(SharedWriter {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        })
    }

    pub fn write_line(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Stdout => writeln!(io::stdout().lock(), "{text}"),
            Output::Stderr => writeln!(io::stderr().lock(), "{text}"),
            Output::Buffer(buffer) => writeln!(buffer.lock(), "{text}"),
            Output::Writer(writer) => writer.write_text(&format!("{text}\n")),
        }
    }

    /// Writes without a trailing newline and flushes, for inline questions.
    pub fn write_inline(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                write!(stdout, "{text}")?;
                stdout.flush()
            }
            Output::Stderr => {
                let mut stderr = io::stderr().lock();
                write!(stderr, "{text}")?;
                stderr.flush()
            }
            Output::Buffer(buffer) => write!(buffer.lock(), "{text}"),
            Output::Writer(writer) => writer.write_text(text),
        }
    }

    /// Draw target that renders progress bars onto this output.
    pub fn draw_target(&self) -> ProgressDrawTarget {
        match self {
            Output::Stdout => ProgressDrawTarget::stdout(),
            Output::Stderr => ProgressDrawTarget::stderr(),
            Output::Buffer(buffer) => ProgressDrawTarget::term_like(Box::new(buffer.clone())),
            Output::Writer(writer) => ProgressDrawTarget::term_like(Box::new(writer.clone())),
        }
    }
}

/// Cloneable in-memory byte sink.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, text: &str) -> io::Result<()> {
        self.lock().extend_from_slice(text.as_bytes());
        Ok(())
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.lock().len())
            .finish()
    }
}

/// Cloneable handle to a caller-supplied writer.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedWriter {
    fn write_text(&self, text: &str) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedWriter").finish_non_exhaustive()
    }
}

impl TermLike for SharedWriter {
    fn width(&self) -> u16 {
        80
    }

    fn move_cursor_up(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor_down(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor_right(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor_left(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn write_line(&self, s: &str) -> io::Result<()> {
        self.write_text(&format!("{s}\n"))
    }

    fn write_str(&self, s: &str) -> io::Result<()> {
        self.write_text(s)
    }

    fn clear_line(&self) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

// Progress bars see the buffer as a plain, cursor-less terminal.
impl TermLike for SharedBuffer {
    fn width(&self) -> u16 {
        80
    }

    fn move_cursor_up(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor_down(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor_right(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor_left(&self, _n: usize) -> io::Result<()> {
        Ok(())
    }

    fn write_line(&self, s: &str) -> io::Result<()> {
        self.append(s)?;
        self.append("\n")
    }

    fn write_str(&self, s: &str) -> io::Result<()> {
        self.append(s)
    }

    fn clear_line(&self) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_lines() {
        let (output, buffer) = Output::buffer();
        output.write_line("first").unwrap();
        output.write_inline("second? ").unwrap();
        assert_eq!(buffer.contents(), "first\nsecond? ");
    }

    #[test]
    fn writer_output_forwards_text() {
        let buffer = SharedBuffer::default();
        let output = Output::writer(BufferWriter(buffer.clone()));
        output.write_line("to file").unwrap();
        assert_eq!(buffer.contents(), "to file\n");

        struct BufferWriter(SharedBuffer);
        impl Write for BufferWriter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
    }

    #[test]
    fn clones_share_the_same_buffer() {
        let (output, buffer) = Output::buffer();
        let clone = output.clone();
        clone.write_line("shared").unwrap();
        assert!(!buffer.is_empty());
        assert_eq!(buffer.contents(), "shared\n");
    }
}
