//! Progress bars for indexing and ranking, plus a log writer that prints
//! above them instead of tearing through them.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static BARS: OnceLock<MultiProgress> = OnceLock::new();

const BAR_TEMPLATE: &str = "{prefix:>8} [{bar:30}] {pos}/{len} {msg}";

fn bars() -> &'static MultiProgress {
    BARS.get_or_init(|| {
        let bars = MultiProgress::new();
        bars.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        bars
    })
}

/// Add a labelled bar counting up to `len`
pub fn add_progress_bar(len: u64, label: &str) -> ProgressBar {
    let bar = bars().add(ProgressBar::new(len));
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(label.to_string());
    bar
}

fn emit(line: &str) {
    let _ = bars().println(line.trim_end_matches('\r'));
}

/// `MakeWriter` handing out line-buffered writers for the fmt layer
#[derive(Default, Clone)]
pub struct LogWriterFactory;

#[derive(Default)]
pub struct LogWriter {
    pending: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.pending.find('\n') {
            emit(&self.pending[..end]);
            self.pending.drain(..=end);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            emit(&self.pending);
            self.pending.clear();
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_is_labelled() {
        let bar = add_progress_bar(3, "index");
        bar.inc(2);
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.length(), Some(3));
        assert_eq!(bar.prefix(), "index");
        bar.finish_and_clear();
    }

    #[test]
    fn test_log_writer_buffers_partial_lines() {
        let mut writer = LogWriterFactory.make_writer();
        assert_eq!(writer.write(b"first line\nsecond").unwrap(), 17);
        assert_eq!(writer.pending, "second");
        writer.flush().unwrap();
        assert!(writer.pending.is_empty());
    }
}
